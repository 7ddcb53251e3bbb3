//! PqPlace - bit-flip-aware page placement via product quantization.
//!
//! This library selects, for each incoming write, a destination storage page
//! chosen to minimize physical bit transitions relative to the page's
//! current content: a wear/energy-aware placement heuristic for
//! byte-addressable persistent storage.
//!
//! # Components
//!
//! - **CodebookTrainer**: splits every page into fixed-size subvectors and
//!   independently learns, per subvector position, a small dictionary of
//!   representative byte patterns (centroids) via k-means over Hamming
//!   distance. Positions are trained in parallel.
//!
//! - **QuantizedPageIndex**: compresses every page into a signature (one
//!   centroid id per position) and answers nearest-page queries by
//!   comparing signatures instead of raw bytes.
//!
//! The caller sequences training → table build → queries; the trained
//! structures are immutable afterwards, so the query phase needs no
//! locking. Page writes that happen after the table is built are not
//! reflected in it (the signatures go stale by design).
//!
//! # Examples
//!
//! ## Full pipeline
//!
//! ```rust
//! use pqplace::prelude::*;
//!
//! // 4 pages of 16 bytes: two all-zero, two all-one.
//! let geom = PageGeometry::new(16, 4)
//!     .with_subvector_size(16)
//!     .with_num_centroids(2);
//! let mut storage = vec![0u8; geom.storage_len()];
//! storage[32..].fill(0xFF);
//!
//! let snapshot = StorageSnapshot::new(&storage, geom).unwrap();
//! let params = TrainerParams::new(100).with_seed(42);
//! let index = pqplace::train_index(geom, &snapshot, params).unwrap();
//!
//! // An all-zero write belongs on one of the all-zero pages.
//! let page = index.find_nearest_page(&[0u8; 16]).unwrap();
//! assert!(page == 0 || page == 1);
//! ```
//!
//! ## Placing a short payload
//!
//! ```rust
//! use pqplace::prelude::*;
//!
//! let geom = PageGeometry::new(16, 2)
//!     .with_subvector_size(16)
//!     .with_num_centroids(2);
//! let storage = vec![0u8; geom.storage_len()];
//! let snapshot = StorageSnapshot::new(&storage, geom).unwrap();
//!
//! let index =
//!     pqplace::train_index(geom, &snapshot, TrainerParams::new(10).with_seed(1)).unwrap();
//!
//! // Payloads shorter than a page are zero-padded to page size.
//! let write = WritePayload::new(b"key=value", geom.page_size).unwrap();
//! let page = index.find_nearest_page(write.as_bytes()).unwrap();
//! assert!(page < geom.num_pages);
//! ```

pub mod codebook;
pub mod distance;
pub mod error;
pub mod geometry;
pub mod index;
pub mod storage;
pub mod trainer;
pub mod types;


/// Prelude module for convenient imports.
///
/// Use `use pqplace::prelude::*;` to import commonly used types.
pub mod prelude {
    pub use crate::codebook::CodebookSet;
    pub use crate::distance::{hamming_distance, hamming_ratio};
    pub use crate::error::{PlacementError, Result};
    pub use crate::geometry::{GeometryError, PageGeometry};
    pub use crate::index::{mismatch_count, IndexStats, QuantizedPageIndex, Signature};
    pub use crate::storage::{StorageSnapshot, WritePayload};
    pub use crate::trainer::{CodebookTrainer, TrainerParams};
    pub use crate::types::{CentroidId, PageId};
}

use crate::error::Result;
use crate::geometry::PageGeometry;
use crate::index::QuantizedPageIndex;
use crate::storage::StorageSnapshot;
use crate::trainer::{CodebookTrainer, TrainerParams};

/// Train codebooks on the snapshot and build a queryable index from it.
///
/// Convenience wrapper over the train → build sequence; blocks until both
/// complete.
pub fn train_index(
    geom: PageGeometry,
    snapshot: &StorageSnapshot<'_>,
    params: TrainerParams,
) -> Result<QuantizedPageIndex> {
    let trainer = CodebookTrainer::new(geom, params)?;
    let codebooks = trainer.train(snapshot)?;
    QuantizedPageIndex::build(codebooks, snapshot)
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let geom = PageGeometry::new(16, 2)
            .with_subvector_size(16)
            .with_num_centroids(2);
        let storage = vec![0u8; geom.storage_len()];
        let snapshot = StorageSnapshot::new(&storage, geom).unwrap();

        let index =
            super::train_index(geom, &snapshot, TrainerParams::new(10).with_seed(0)).unwrap();
        let page = index.find_nearest_page(&[0u8; 16]).unwrap();
        assert!(page < geom.num_pages);
    }
}
