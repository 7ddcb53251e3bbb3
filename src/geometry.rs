//! Storage geometry configuration.
//!
//! All sizes are runtime values rather than compile-time constants so that
//! multiple trainers/indices with different parameters can coexist (and be
//! tested) in one process.

use crate::types::MAX_CENTROIDS;
use thiserror::Error;

/// Default page size in bytes.
pub const DEFAULT_PAGE_SIZE: usize = 4096;
/// Default subvector size in bytes.
pub const DEFAULT_SUBVECTOR_SIZE: usize = 16;
/// Default number of centroids per codebook.
pub const DEFAULT_NUM_CENTROIDS: usize = 256;

/// Errors from an invalid storage geometry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("geometry field `{0}` must be non-zero")]
    ZeroField(&'static str),

    #[error("page size {page_size} is not divisible by subvector size {subvector_size}")]
    UnalignedSubvectors {
        page_size: usize,
        subvector_size: usize,
    },

    #[error("{num_centroids} centroids exceed the centroid id range")]
    TooManyCentroids { num_centroids: usize },
}

/// Geometry of the managed storage region and of its quantized encoding.
///
/// A page of `page_size` bytes is split into `num_subvectors()` fixed
/// positions of `subvector_size` bytes each; every position gets its own
/// codebook of `num_centroids` centroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    /// Size of one storage page in bytes.
    pub page_size: usize,
    /// Number of pages in the mapped region.
    pub num_pages: usize,
    /// Size of one subvector in bytes. Must divide `page_size`.
    pub subvector_size: usize,
    /// Number of centroids learned per subvector position.
    pub num_centroids: usize,
}

impl PageGeometry {
    /// Create a geometry with the default subvector/centroid parameters.
    pub fn new(page_size: usize, num_pages: usize) -> Self {
        Self {
            page_size,
            num_pages,
            subvector_size: DEFAULT_SUBVECTOR_SIZE,
            num_centroids: DEFAULT_NUM_CENTROIDS,
        }
    }

    /// Set the subvector size.
    pub fn with_subvector_size(mut self, subvector_size: usize) -> Self {
        self.subvector_size = subvector_size;
        self
    }

    /// Set the number of centroids per codebook.
    pub fn with_num_centroids(mut self, num_centroids: usize) -> Self {
        self.num_centroids = num_centroids;
        self
    }

    /// Number of subvector positions per page.
    #[inline]
    pub fn num_subvectors(&self) -> usize {
        self.page_size / self.subvector_size
    }

    /// Total length in bytes of the backing storage region.
    #[inline]
    pub fn storage_len(&self) -> usize {
        self.num_pages * self.page_size
    }

    /// Byte offset of a page within the storage region.
    #[inline]
    pub fn page_offset(&self, page: usize) -> usize {
        page * self.page_size
    }

    /// Byte offset of a subvector position within a page.
    #[inline]
    pub fn subvector_offset(&self, pos: usize) -> usize {
        pos * self.subvector_size
    }

    /// Validate the geometry, failing fast on misconfiguration.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.page_size == 0 {
            return Err(GeometryError::ZeroField("page_size"));
        }
        if self.num_pages == 0 {
            return Err(GeometryError::ZeroField("num_pages"));
        }
        if self.subvector_size == 0 {
            return Err(GeometryError::ZeroField("subvector_size"));
        }
        if self.num_centroids == 0 {
            return Err(GeometryError::ZeroField("num_centroids"));
        }
        if self.page_size % self.subvector_size != 0 {
            return Err(GeometryError::UnalignedSubvectors {
                page_size: self.page_size,
                subvector_size: self.subvector_size,
            });
        }
        if self.num_centroids > MAX_CENTROIDS {
            return Err(GeometryError::TooManyCentroids {
                num_centroids: self.num_centroids,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let geom = PageGeometry::new(4096, 1000);
        assert_eq!(geom.subvector_size, DEFAULT_SUBVECTOR_SIZE);
        assert_eq!(geom.num_centroids, DEFAULT_NUM_CENTROIDS);
        assert_eq!(geom.num_subvectors(), 256);
        assert_eq!(geom.storage_len(), 4096 * 1000);
        assert!(geom.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let geom = PageGeometry::new(64, 8)
            .with_subvector_size(16)
            .with_num_centroids(4);
        assert_eq!(geom.num_subvectors(), 4);
        assert!(geom.validate().is_ok());
    }

    #[test]
    fn test_zero_fields_rejected() {
        for geom in [
            PageGeometry::new(0, 10),
            PageGeometry::new(64, 0),
            PageGeometry::new(64, 10).with_subvector_size(0),
            PageGeometry::new(64, 10).with_num_centroids(0),
        ] {
            assert!(matches!(
                geom.validate(),
                Err(GeometryError::ZeroField(_))
            ));
        }
    }

    #[test]
    fn test_unaligned_subvectors_rejected() {
        let geom = PageGeometry::new(100, 10).with_subvector_size(16);
        assert_eq!(
            geom.validate(),
            Err(GeometryError::UnalignedSubvectors {
                page_size: 100,
                subvector_size: 16,
            })
        );
    }

    #[test]
    fn test_too_many_centroids_rejected() {
        let geom = PageGeometry::new(64, 10).with_num_centroids(1 << 17);
        assert!(matches!(
            geom.validate(),
            Err(GeometryError::TooManyCentroids { .. })
        ));
    }

    #[test]
    fn test_offsets() {
        let geom = PageGeometry::new(64, 8).with_subvector_size(16);
        assert_eq!(geom.page_offset(3), 192);
        assert_eq!(geom.subvector_offset(2), 32);
    }
}
