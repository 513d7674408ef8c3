use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use thiserror::Error;

/// Errors raised by a [`crate::JobQueue`].
#[derive(Debug, Error)]
pub enum QueueError {
    /// No job exists with the requested id.
    #[error("job not found: {0:?}")]
    NotFound(inkwell_core::ids::JobId),
    /// A job-id supplied for deduplication already identifies an in-flight
    /// job.
    #[error("job id already in use: {0:?}")]
    DuplicateJobId(inkwell_core::ids::JobId),
    /// A job exhausted its stalled-reclamation budget.
    #[error("job stalled past its reclamation budget: {0:?}")]
    Stalled(inkwell_core::ids::JobId),
    /// A job exhausted its retry attempts.
    #[error("job exceeded max retries: {0:?}")]
    MaxRetriesExceeded(inkwell_core::ids::JobId),
}

impl ErrorKindExt for QueueError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicateJobId(_) => ErrorKind::ValidationError,
            Self::Stalled(_) => ErrorKind::Stalled,
            Self::MaxRetriesExceeded(_) => ErrorKind::MaxRetriesExceeded,
        }
    }
}

impl From<QueueError> for CoreError {
    fn from(err: QueueError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, QueueError>;
