use crate::context::JobContext;

/// Implemented by the business logic bound to a queue name, e.g. the
/// ingestion pipeline handling `index-document` jobs.
///
/// Handlers report their own progress through [`JobContext::report_progress`]
/// and must observe [`JobContext::cancellation`] at any suspension point that
/// can safely be interrupted; the pool does not forcibly abort handler
/// futures.
pub trait Handler<P>: Send + Sync {
    /// Runs one attempt of this job. Returning `Err` triggers the queue's
    /// retry policy; returning `Ok` marks the job completed.
    fn handle(
        &self,
        payload: P,
        ctx: JobContext,
    ) -> impl std::future::Future<Output = inkwell_core::Result<()>> + Send;
}
