//! Codebook training: independent k-means per subvector position, over
//! Hamming distance.
//!
//! Every position's training set is the subvector at that offset from every
//! page. Positions share nothing but the read-only snapshot, so they are
//! trained in parallel on a dedicated pool; the pool is joined before the
//! resulting codebooks are handed to the index.

use crate::codebook::CodebookSet;
use crate::error::{PlacementError, Result};
use crate::geometry::PageGeometry;
use crate::storage::StorageSnapshot;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info};

/// Default iteration cap per position.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Training parameters.
#[derive(Debug, Clone, Copy)]
pub struct TrainerParams {
    /// Cap on k-means passes per position.
    pub max_iterations: usize,
    /// Base seed for centroid initialization. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl TrainerParams {
    /// Create parameters with the given iteration cap.
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            seed: None,
        }
    }

    /// Fix the seed for reproducible training.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

/// Trains one codebook per subvector position from a storage snapshot.
pub struct CodebookTrainer {
    geom: PageGeometry,
    params: TrainerParams,
}

impl CodebookTrainer {
    /// Create a trainer for the given geometry.
    pub fn new(geom: PageGeometry, params: TrainerParams) -> Result<Self> {
        geom.validate()?;
        Ok(Self { geom, params })
    }

    /// The geometry this trainer was created with.
    pub fn geometry(&self) -> &PageGeometry {
        &self.geom
    }

    /// Train all codebooks from the snapshot.
    ///
    /// Blocks until every position has converged or hit the iteration cap.
    /// All worker threads are joined before this returns, so the returned
    /// set is complete and immutable.
    pub fn train(&self, snapshot: &StorageSnapshot<'_>) -> Result<CodebookSet> {
        if *snapshot.geometry() != self.geom {
            return Err(PlacementError::GeometryMismatch);
        }

        let num_threads = std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1).max(1))
            .unwrap_or(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| PlacementError::Internal(e.to_string()))?;

        let num_subvectors = self.geom.num_subvectors();
        info!(num_threads, num_subvectors, "training codebooks");

        // Each position is trained by exactly one worker; collect() joins
        // the pool before the arena is assembled.
        let trained: Vec<Vec<u8>> = pool.install(|| {
            (0..num_subvectors)
                .into_par_iter()
                .map(|pos| self.train_position(snapshot, pos))
                .collect()
        });

        let mut codebooks = CodebookSet::zeroed(self.geom);
        for (pos, centroids) in trained.iter().enumerate() {
            codebooks.position_mut(pos).copy_from_slice(centroids);
        }
        Ok(codebooks)
    }

    /// Run k-means for a single position; returns the flat centroid bytes.
    fn train_position(&self, snapshot: &StorageSnapshot<'_>, pos: usize) -> Vec<u8> {
        let samples: Vec<&[u8]> = (0..self.geom.num_pages)
            .map(|page| snapshot.subvector(page, pos))
            .collect();

        let mut rng = match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(pos as u64)),
            None => StdRng::from_entropy(),
        };

        let mut clustering = Clustering::init(
            &samples,
            self.geom.num_centroids,
            self.geom.subvector_size,
            &mut rng,
        );

        let mut iterations = 0;
        while iterations < self.params.max_iterations {
            clustering.assign();
            iterations += 1;
            if !clustering.update() {
                break;
            }
        }

        debug!(pos, iterations, "position trained");
        clustering.into_centroids()
    }
}

/// K-means state for one subvector position.
///
/// Kept separate from the trainer so the assignment and update passes can
/// be stepped individually in tests.
pub(crate) struct Clustering<'a> {
    samples: &'a [&'a [u8]],
    sub_size: usize,
    k: usize,
    /// Flat centroid storage, `k * sub_size` bytes.
    centroids: Vec<u8>,
    /// Current cluster of each sample.
    assignments: Vec<usize>,
}

impl<'a> Clustering<'a> {
    /// Initialize centroids by uniform with-replacement sampling.
    ///
    /// Sampling with replacement means duplicate centroids are allowed, so
    /// initialization terminates even when there are fewer samples than
    /// centroids.
    pub(crate) fn init(
        samples: &'a [&'a [u8]],
        k: usize,
        sub_size: usize,
        rng: &mut StdRng,
    ) -> Self {
        debug_assert!(!samples.is_empty());

        let pick = Uniform::from(0..samples.len());
        let mut centroids = Vec::with_capacity(k * sub_size);
        for _ in 0..k {
            centroids.extend_from_slice(samples[pick.sample(rng)]);
        }

        Self {
            samples,
            sub_size,
            k,
            centroids,
            assignments: vec![0; samples.len()],
        }
    }

    /// Assign every sample to its nearest centroid.
    ///
    /// Ties resolve to the lowest centroid id (left-to-right scan, strict
    /// less-than). Returns the total intra-cluster Hamming cost under the
    /// new assignment.
    pub(crate) fn assign(&mut self) -> u64 {
        let mut total_cost = 0u64;

        for (i, sample) in self.samples.iter().enumerate() {
            let mut best = 0usize;
            let mut best_dist = u32::MAX;
            for (c, centroid) in self.centroids.chunks_exact(self.sub_size).enumerate() {
                let dist = crate::distance::hamming_distance(sample, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            self.assignments[i] = best;
            total_cost += best_dist as u64;
        }

        total_cost
    }

    /// Recompute each non-empty cluster's centroid as the per-byte
    /// truncating mean of its members. Empty clusters are left unchanged.
    ///
    /// Returns whether any centroid changed; `false` means convergence.
    pub(crate) fn update(&mut self) -> bool {
        let lanes = self.k * self.sub_size;
        let mut sums = vec![0u64; lanes];
        let mut counts = vec![0u64; self.k];

        for (i, sample) in self.samples.iter().enumerate() {
            let c = self.assignments[i];
            counts[c] += 1;
            let base = c * self.sub_size;
            for (lane, &byte) in sample.iter().enumerate() {
                sums[base + lane] += byte as u64;
            }
        }

        let mut changed = false;
        for c in 0..self.k {
            if counts[c] == 0 {
                continue;
            }
            let base = c * self.sub_size;
            for lane in 0..self.sub_size {
                let mean = (sums[base + lane] / counts[c]) as u8;
                if self.centroids[base + lane] != mean {
                    self.centroids[base + lane] = mean;
                    changed = true;
                }
            }
        }

        changed
    }

    pub(crate) fn into_centroids(self) -> Vec<u8> {
        self.centroids
    }

    #[cfg(test)]
    pub(crate) fn centroid(&self, c: usize) -> &[u8] {
        &self.centroids[c * self.sub_size..(c + 1) * self.sub_size]
    }
}
