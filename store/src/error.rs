use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use thiserror::Error;

/// Errors raised by a [`crate::ChunkStoreBackend`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No chunk exists with the requested id.
    #[error("chunk not found: {0:?}")]
    ChunkNotFound(inkwell_core::ids::ChunkId),
    /// No document exists with the requested id.
    #[error("document not found: {0:?}")]
    DocumentNotFound(inkwell_core::ids::DocumentId),
    /// A vector's length did not match the store's configured dimension.
    #[error("dimension mismatch: store expects {expected}, got {actual}")]
    DimensionMismatch {
        /// The store's configured dimension.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },
    /// The backend rejected a read or write.
    #[error("chunk store backend error: {0}")]
    Backend(String),
}

impl ErrorKindExt for StoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::ChunkNotFound(_) | Self::DocumentNotFound(_) => ErrorKind::NotFound,
            Self::DimensionMismatch { .. } => ErrorKind::ValidationError,
            Self::Backend(_) => ErrorKind::DatabaseError,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, StoreError>;
