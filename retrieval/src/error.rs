use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use thiserror::Error;

/// Errors raised by the hybrid retrieval engine.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Weights were negative, or both zero.
    #[error("vectorWeight and keywordWeight must be non-negative and not both zero")]
    InvalidWeights,
    /// Both the vector and lexical subsearches failed.
    #[error("both vector and lexical search failed: {vector_error} / {lexical_error}")]
    BothSearchesFailed {
        /// The vector subsearch's failure message.
        vector_error: String,
        /// The lexical subsearch's failure message.
        lexical_error: String,
    },
    /// The chunk store rejected a request.
    #[error(transparent)]
    Store(#[from] inkwell_store::StoreError),
}

impl ErrorKindExt for RetrievalError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidWeights => ErrorKind::ValidationError,
            Self::BothSearchesFailed { .. } => ErrorKind::DatabaseError,
            Self::Store(err) => err.kind(),
        }
    }
}

impl From<RetrievalError> for CoreError {
    fn from(err: RetrievalError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, RetrievalError>;
