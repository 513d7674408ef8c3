use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use inkwell_core::ids::JobId;
use inkwell_queue::Progress;
use tokio_util::sync::CancellationToken;

/// A type-erased callback into the owning queue's progress store, so
/// [`JobContext`] doesn't need to carry the queue's payload type parameter.
type ProgressSink = Arc<dyn Fn(Progress) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Per-job context handed to a [`crate::Handler`] for the duration of one
/// attempt.
///
/// Carries everything the ingestion pipeline and similar handlers need from
/// the pool: how to report progress, a scoped logging span, this job's
/// identifier, and a cancellation signal that fires on pool shutdown.
#[derive(Clone)]
pub struct JobContext {
    job_id: JobId,
    cancel: CancellationToken,
    progress: ProgressSink,
    span: tracing::Span,
}

impl JobContext {
    pub(crate) fn new(job_id: JobId, cancel: CancellationToken, progress: ProgressSink) -> Self {
        let span = tracing::info_span!("job", job_id = %job_id);
        Self { job_id, cancel, progress, span }
    }

    /// This attempt's job identifier.
    #[must_use]
    pub const fn job_id(&self) -> JobId {
        self.job_id
    }

    /// The cancellation signal that fires when the pool is shutting down or
    /// the job is otherwise being aborted.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether cancellation has already been signaled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A logging span scoped to this job, for `tracing::*!(parent: ctx.span(), ...)`.
    #[must_use]
    pub const fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Reports a progress update. Best-effort: a failure to persist it must
    /// never fail the handler.
    pub async fn report_progress(&self, progress: Progress) {
        (self.progress)(progress).await;
    }
}
