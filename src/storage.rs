//! Borrowed views over the externally owned storage region.
//!
//! The backing memory (typically a mapped file) belongs to the caller; this
//! module only addresses it as fixed-size pages and subvectors. Nothing here
//! allocates or frees storage.

use crate::error::{PlacementError, Result};
use crate::geometry::PageGeometry;

/// Read-only view of the full storage region, addressed as pages.
///
/// The view captures storage content at one point in time as far as the
/// index is concerned; the caller must not mutate the region while a
/// training or table-build pass is reading it.
#[derive(Debug, Clone, Copy)]
pub struct StorageSnapshot<'a> {
    data: &'a [u8],
    geom: PageGeometry,
}

impl<'a> StorageSnapshot<'a> {
    /// Wrap a raw storage buffer.
    ///
    /// Fails if the buffer length does not equal `geom.storage_len()`.
    pub fn new(data: &'a [u8], geom: PageGeometry) -> Result<Self> {
        geom.validate()?;
        if data.len() != geom.storage_len() {
            return Err(PlacementError::SnapshotSizeMismatch {
                expected: geom.storage_len(),
                got: data.len(),
            });
        }
        Ok(Self { data, geom })
    }

    /// The geometry this snapshot was created with.
    #[inline]
    pub fn geometry(&self) -> &PageGeometry {
        &self.geom
    }

    /// The whole region as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The content of one page.
    #[inline]
    pub fn page(&self, page: usize) -> &'a [u8] {
        debug_assert!(page < self.geom.num_pages);
        let start = self.geom.page_offset(page);
        &self.data[start..start + self.geom.page_size]
    }

    /// The subvector at `pos` within `page`.
    #[inline]
    pub fn subvector(&self, page: usize, pos: usize) -> &'a [u8] {
        debug_assert!(pos < self.geom.num_subvectors());
        let start = self.geom.page_offset(page) + self.geom.subvector_offset(pos);
        &self.data[start..start + self.geom.subvector_size]
    }
}

/// An owned, page-sized write buffer.
///
/// Incoming payloads may be shorter than a page; they are zero-padded to
/// `page_size` so they can be encoded and compared like any page.
#[derive(Debug, Clone)]
pub struct WritePayload {
    data: Vec<u8>,
    payload_len: usize,
}

impl WritePayload {
    /// Build a page-sized buffer from a (possibly shorter) payload.
    pub fn new(payload: &[u8], page_size: usize) -> Result<Self> {
        if payload.len() > page_size {
            return Err(PlacementError::PayloadTooLarge {
                len: payload.len(),
                page_size,
            });
        }
        let mut data = vec![0u8; page_size];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            data,
            payload_len: payload.len(),
        })
    }

    /// The padded page-sized buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length of the original payload before padding.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }
}
