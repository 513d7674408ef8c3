use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use thiserror::Error;

/// Errors raised by the embedding HTTP client.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The HTTP request itself failed (connection, TLS, decode).
    #[error("embedding request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// The embedding endpoint returned a non-success status.
    #[error("embedding endpoint returned status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, truncated for logging.
        body: String,
    },
    /// A returned vector's length did not match the configured dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The configured dimension.
        expected: usize,
        /// The dimension actually returned.
        actual: usize,
    },
    /// The request exceeded its deadline.
    #[error("embedding request timed out")]
    Timeout,
    /// The operation was cancelled before completing.
    #[error("embedding request cancelled")]
    Cancelled,
    /// All retry attempts were exhausted.
    #[error("embedding request failed after {attempts} attempts")]
    MaxRetriesExceeded {
        /// How many attempts were made.
        attempts: u32,
    },
}

impl ErrorKindExt for EmbedError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(_) | Self::Status { .. } => ErrorKind::EmbeddingFailed,
            Self::DimensionMismatch { .. } => ErrorKind::ValidationError,
            Self::Timeout => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::MaxRetriesExceeded { .. } => ErrorKind::MaxRetriesExceeded,
        }
    }
}

impl From<EmbedError> for CoreError {
    fn from(err: EmbedError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, EmbedError>;
