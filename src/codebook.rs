//! Trained codebooks stored in a flat, index-addressed arena.
//!
//! All centroids live in one contiguous buffer of
//! `num_subvectors * num_centroids * subvector_size` bytes with computed
//! offsets, so nearest-centroid scans walk memory linearly instead of
//! chasing nested containers.

use crate::distance::hamming_distance;
use crate::geometry::PageGeometry;
use crate::types::CentroidId;

/// The complete set of codebooks, one per subvector position.
///
/// Centroid order within a position is fixed once training completes; the
/// order defines the centroid id recorded in signatures.
#[derive(Debug, Clone)]
pub struct CodebookSet {
    geom: PageGeometry,
    /// Flat arena: position-major, then centroid, then bytes.
    data: Vec<u8>,
}

impl CodebookSet {
    /// Allocate a zeroed arena for the given geometry.
    ///
    /// The trainer fills it position by position before the set is handed
    /// to the index.
    pub(crate) fn zeroed(geom: PageGeometry) -> Self {
        let len = geom.num_subvectors() * geom.num_centroids * geom.subvector_size;
        Self {
            geom,
            data: vec![0u8; len],
        }
    }

    /// The geometry the codebooks were trained for.
    #[inline]
    pub fn geometry(&self) -> &PageGeometry {
        &self.geom
    }

    #[inline]
    fn offset(&self, pos: usize, id: usize) -> usize {
        (pos * self.geom.num_centroids + id) * self.geom.subvector_size
    }

    /// The centroid byte vector for `(position, id)`.
    #[inline]
    pub fn centroid(&self, pos: usize, id: usize) -> &[u8] {
        debug_assert!(pos < self.geom.num_subvectors());
        debug_assert!(id < self.geom.num_centroids);
        let start = self.offset(pos, id);
        &self.data[start..start + self.geom.subvector_size]
    }

    /// All centroids of one position as a contiguous slice.
    #[inline]
    pub fn position(&self, pos: usize) -> &[u8] {
        let start = self.offset(pos, 0);
        let len = self.geom.num_centroids * self.geom.subvector_size;
        &self.data[start..start + len]
    }

    /// Mutable view of one position's centroids, for the trainer.
    #[inline]
    pub(crate) fn position_mut(&mut self, pos: usize) -> &mut [u8] {
        let start = self.offset(pos, 0);
        let len = self.geom.num_centroids * self.geom.subvector_size;
        &mut self.data[start..start + len]
    }

    /// Find the nearest centroid to `subvector` at `pos` by Hamming distance.
    ///
    /// Ties resolve to the lowest centroid id: the scan runs left to right
    /// and only a strictly smaller distance replaces the current best.
    pub fn nearest_centroid(&self, pos: usize, subvector: &[u8]) -> (CentroidId, u32) {
        debug_assert_eq!(subvector.len(), self.geom.subvector_size);

        let sub_size = self.geom.subvector_size;
        let mut best_id = 0usize;
        let mut best_dist = u32::MAX;

        for (id, centroid) in self.position(pos).chunks_exact(sub_size).enumerate() {
            let dist = hamming_distance(subvector, centroid);
            if dist < best_dist {
                best_dist = dist;
                best_id = id;
            }
        }

        (best_id as CentroidId, best_dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_set() -> CodebookSet {
        // 2 positions, 3 centroids, 4-byte subvectors.
        let geom = PageGeometry::new(8, 4)
            .with_subvector_size(4)
            .with_num_centroids(3);
        let mut set = CodebookSet::zeroed(geom);
        // Position 0: centroids 0x00.., 0x0F.., 0xFF..
        set.position_mut(0).copy_from_slice(&[
            0x00, 0x00, 0x00, 0x00, //
            0x0F, 0x0F, 0x0F, 0x0F, //
            0xFF, 0xFF, 0xFF, 0xFF,
        ]);
        // Position 1: all centroids zero.
        set
    }

    #[test]
    fn test_centroid_addressing() {
        let set = small_set();
        assert_eq!(set.centroid(0, 0), &[0x00; 4]);
        assert_eq!(set.centroid(0, 1), &[0x0F; 4]);
        assert_eq!(set.centroid(0, 2), &[0xFF; 4]);
        assert_eq!(set.centroid(1, 2), &[0x00; 4]);
    }

    #[test]
    fn test_nearest_centroid() {
        let set = small_set();
        let (id, dist) = set.nearest_centroid(0, &[0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(id, 2);
        assert_eq!(dist, 1);

        let (id, dist) = set.nearest_centroid(0, &[0x0F, 0x0F, 0x00, 0x00]);
        assert_eq!(id, 1);
        assert_eq!(dist, 8);
    }

    #[test]
    fn test_nearest_centroid_tie_breaks_low() {
        // Position 1 has three identical centroids; the lowest id must win.
        let set = small_set();
        let (id, _) = set.nearest_centroid(1, &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(id, 0);
    }
}
