//! Core type definitions for the placement library.
//!
//! - `PageId`: index of a storage page within the mapped region
//! - `CentroidId`: index of a centroid within one position's codebook

/// Index of a storage page, in `[0, num_pages)`.
pub type PageId = usize;

/// Index of a centroid within a codebook, in `[0, num_centroids)`.
///
/// `u16` bounds the supported codebook size; `PageGeometry::validate`
/// rejects geometries that would overflow it.
pub type CentroidId = u16;

/// Largest number of centroids a `CentroidId` can address.
pub const MAX_CENTROIDS: usize = (CentroidId::MAX as usize) + 1;
