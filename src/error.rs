//! Error types shared by the trainer and the index.

use crate::geometry::GeometryError;
use thiserror::Error;

/// Errors from training and query operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("storage snapshot length mismatch: expected {expected} bytes, got {got}")]
    SnapshotSizeMismatch { expected: usize, got: usize },

    #[error("write buffer length mismatch: expected {expected} bytes, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },

    #[error("write payload of {len} bytes does not fit in a {page_size}-byte page")]
    PayloadTooLarge { len: usize, page_size: usize },

    #[error("codebook geometry does not match snapshot geometry")]
    GeometryMismatch,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, PlacementError>;
