use inkwell_core::{CoreError, ErrorKind, ErrorKindExt};
use thiserror::Error;

/// Errors raised by a [`crate::WorkerPool`] itself, distinct from whatever a
/// [`crate::Handler`] returns (which is reported to the queue as a job
/// failure, not surfaced here).
#[derive(Debug, Error)]
pub enum WorkerError {
    /// `shutdown` did not observe all active jobs finish within its timeout.
    #[error("shutdown timed out with {0} job(s) still active")]
    ShutdownTimeout(usize),
    /// The underlying queue rejected an operation the pool needed.
    #[error(transparent)]
    Queue(#[from] inkwell_queue::QueueError),
}

impl ErrorKindExt for WorkerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::ShutdownTimeout(_) => ErrorKind::Timeout,
            Self::Queue(e) => e.kind(),
        }
    }
}

impl From<WorkerError> for CoreError {
    fn from(err: WorkerError) -> Self {
        let kind = err.kind();
        CoreError::new(kind, err.to_string()).with_source(err)
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, WorkerError>;
