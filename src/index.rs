//! Quantized nearest-page index.
//!
//! The index compresses every page into a signature (one centroid id per
//! subvector position) and answers "which page least differs from this
//! write" by scanning signatures instead of raw bytes: an O(page_size)
//! comparison per page becomes O(num_subvectors). The result is a placement
//! heuristic, not an exact nearest neighbor.
//!
//! The signature table is built once from a snapshot and is immutable
//! afterwards; pages overwritten later keep their stale signatures.

use crate::codebook::CodebookSet;
use crate::error::{PlacementError, Result};
use crate::geometry::PageGeometry;
use crate::storage::StorageSnapshot;
use crate::types::{CentroidId, PageId};
use tracing::debug;

/// A page's quantized encoding: one centroid id per subvector position.
///
/// A signature is only meaningful relative to the codebooks that produced
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    ids: Vec<CentroidId>,
}

impl Signature {
    /// The centroid ids, position by position.
    #[inline]
    pub fn ids(&self) -> &[CentroidId] {
        &self.ids
    }

    /// Number of subvector positions encoded.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the signature is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Number of positions where two signatures' centroid ids differ.
///
/// This is a positional equality count, not a bitwise distance on the ids.
#[inline]
pub fn mismatch_count(a: &[CentroidId], b: &[CentroidId]) -> usize {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
}

/// Summary statistics for a built index.
#[derive(Debug, Clone)]
pub struct IndexStats {
    /// Number of pages covered by the signature table.
    pub num_pages: usize,
    /// Signature length (subvector positions per page).
    pub num_subvectors: usize,
    /// Approximate memory held by signatures and codebooks, in bytes.
    pub memory_bytes: usize,
}

/// Nearest-page index over quantized page signatures.
pub struct QuantizedPageIndex {
    geom: PageGeometry,
    codebooks: CodebookSet,
    /// Flat signature table, `num_pages * num_subvectors` ids, page-major.
    signatures: Vec<CentroidId>,
}

impl QuantizedPageIndex {
    /// Build the signature table for every page of the snapshot.
    ///
    /// Must run after training completes; the codebooks and the snapshot
    /// must share one geometry.
    pub fn build(codebooks: CodebookSet, snapshot: &StorageSnapshot<'_>) -> Result<Self> {
        if snapshot.geometry() != codebooks.geometry() {
            return Err(PlacementError::GeometryMismatch);
        }
        let geom = *codebooks.geometry();

        let num_subvectors = geom.num_subvectors();
        let mut signatures = Vec::with_capacity(geom.num_pages * num_subvectors);
        for page in 0..geom.num_pages {
            for pos in 0..num_subvectors {
                let (id, _) = codebooks.nearest_centroid(pos, snapshot.subvector(page, pos));
                signatures.push(id);
            }
        }

        debug!(
            num_pages = geom.num_pages,
            num_subvectors, "signature table built"
        );

        Ok(Self {
            geom,
            codebooks,
            signatures,
        })
    }

    /// The geometry the index was built with.
    #[inline]
    pub fn geometry(&self) -> &PageGeometry {
        &self.geom
    }

    /// The trained codebooks backing this index.
    #[inline]
    pub fn codebooks(&self) -> &CodebookSet {
        &self.codebooks
    }

    /// The stored signature of a page.
    #[inline]
    pub fn signature(&self, page: PageId) -> &[CentroidId] {
        debug_assert!(page < self.geom.num_pages);
        let n = self.geom.num_subvectors();
        &self.signatures[page * n..(page + 1) * n]
    }

    /// Encode a page-sized buffer into a signature.
    ///
    /// Deterministic: the same buffer always encodes to the same signature.
    pub fn encode(&self, buffer: &[u8]) -> Result<Signature> {
        if buffer.len() != self.geom.page_size {
            return Err(PlacementError::BufferSizeMismatch {
                expected: self.geom.page_size,
                got: buffer.len(),
            });
        }

        let sub_size = self.geom.subvector_size;
        let ids = buffer
            .chunks_exact(sub_size)
            .enumerate()
            .map(|(pos, subvector)| self.codebooks.nearest_centroid(pos, subvector).0)
            .collect();

        Ok(Signature { ids })
    }

    /// Find the page whose signature least mismatches the write buffer's.
    ///
    /// The buffer is encoded with the same nearest-centroid rule used for
    /// the table, then compared against every page by mismatch count. Ties
    /// resolve to the lowest page index (strict less-than scan in index
    /// order). Returns a page index in `[0, num_pages)`.
    pub fn find_nearest_page(&self, write_buffer: &[u8]) -> Result<PageId> {
        let query = self.encode(write_buffer)?;

        let n = self.geom.num_subvectors();
        let mut best_page = 0usize;
        let mut best_mismatch = usize::MAX;

        for (page, stored) in self.signatures.chunks_exact(n).enumerate() {
            let mismatch = mismatch_count(query.ids(), stored);
            if mismatch < best_mismatch {
                best_mismatch = mismatch;
                best_page = page;
            }
        }

        Ok(best_page)
    }

    /// Summary statistics.
    pub fn stats(&self) -> IndexStats {
        let n = self.geom.num_subvectors();
        IndexStats {
            num_pages: self.geom.num_pages,
            num_subvectors: n,
            memory_bytes: self.signatures.len() * std::mem::size_of::<CentroidId>()
                + n * self.geom.num_centroids * self.geom.subvector_size,
        }
    }
}
