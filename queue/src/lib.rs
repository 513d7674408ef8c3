//! Job queue capability trait and in-memory reference backend.
//!
//! This is the C6 "Job Queue" component: a durable, retryable,
//! priority-aware unit-of-work queue that a worker pool pulls from.
//! [`InMemoryJobQueue`] is the reference backend; a production deployment
//! swaps in a durable, at-least-once, priority-and-delay-capable transport
//! behind the same trait.

mod error;
mod memory;
mod model;

pub use error::{QueueError, Result};
pub use memory::InMemoryJobQueue;
pub use model::{
    Backoff, ClaimedJob, Counts, EnqueueOptions, JobRecord, JobState, Progress, RetryPolicy,
    StalledOutcome,
};

use inkwell_core::ids::JobId;
use std::time::Duration;

/// The capability trait a job queue backend must implement.
///
/// Mirrors [`InMemoryJobQueue`]'s inherent methods so a caller can be
/// generic over the backend.
pub trait JobQueue<P>: Send + Sync {
    /// Enqueues a job, returning its id.
    fn enqueue(
        &self,
        name: &str,
        payload: P,
        opts: EnqueueOptions,
    ) -> impl std::future::Future<Output = Result<JobId>> + Send;

    /// Enqueues many jobs in order, returning their ids.
    fn enqueue_bulk(
        &self,
        jobs: Vec<(String, P, EnqueueOptions)>,
    ) -> impl std::future::Future<Output = Result<Vec<JobId>>> + Send;

    /// Fetches a job's current record.
    fn get(&self, job_id: JobId) -> impl std::future::Future<Output = Result<JobRecord<P>>> + Send;

    /// Removes a job outright.
    fn remove(&self, job_id: JobId) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Stops handing out new jobs from [`Self::claim`].
    fn pause(&self) -> impl std::future::Future<Output = ()> + Send;

    /// Reopens the flow of jobs to [`Self::claim`].
    fn resume(&self) -> impl std::future::Future<Output = ()> + Send;

    /// Aggregate counts by state.
    fn counts(&self) -> impl std::future::Future<Output = Counts> + Send;

    /// Removes up to `count` jobs in `state` older than `older_than`.
    fn clean(
        &self,
        older_than: Duration,
        count: usize,
        state: JobState,
    ) -> impl std::future::Future<Output = usize> + Send;

    /// Claims the next eligible waiting job.
    fn claim(&self) -> impl std::future::Future<Output = Option<ClaimedJob<P>>> + Send;

    /// Renews an active job's lease.
    fn heartbeat(&self, job_id: JobId) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Records a progress update; best-effort.
    fn report_progress(
        &self,
        job_id: JobId,
        progress: Progress,
    ) -> impl std::future::Future<Output = ()> + Send;

    /// Marks a job completed.
    fn complete(&self, job_id: JobId) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fails a job's current attempt, requeuing it per its retry policy or
    /// permanently failing it once attempts are exhausted.
    fn fail(
        &self,
        job_id: JobId,
        error: String,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Reclaims jobs whose active lease expired without a heartbeat.
    fn reclaim_stalled(&self) -> impl std::future::Future<Output = Vec<StalledOutcome>> + Send;
}

impl<P: Clone + Send + Sync + 'static> JobQueue<P> for InMemoryJobQueue<P> {
    async fn enqueue(&self, name: &str, payload: P, opts: EnqueueOptions) -> Result<JobId> {
        Self::enqueue(self, name, payload, opts).await
    }

    async fn enqueue_bulk(&self, jobs: Vec<(String, P, EnqueueOptions)>) -> Result<Vec<JobId>> {
        Self::enqueue_bulk(self, jobs).await
    }

    async fn get(&self, job_id: JobId) -> Result<JobRecord<P>> {
        Self::get(self, job_id).await
    }

    async fn remove(&self, job_id: JobId) -> Result<()> {
        Self::remove(self, job_id).await
    }

    async fn pause(&self) {
        Self::pause(self).await;
    }

    async fn resume(&self) {
        Self::resume(self).await;
    }

    async fn counts(&self) -> Counts {
        Self::counts(self).await
    }

    async fn clean(&self, older_than: Duration, count: usize, state: JobState) -> usize {
        Self::clean(self, older_than, count, state).await
    }

    async fn claim(&self) -> Option<ClaimedJob<P>> {
        Self::claim(self).await
    }

    async fn heartbeat(&self, job_id: JobId) -> Result<()> {
        Self::heartbeat(self, job_id).await
    }

    async fn report_progress(&self, job_id: JobId, progress: Progress) {
        Self::report_progress(self, job_id, progress).await;
    }

    async fn complete(&self, job_id: JobId) -> Result<()> {
        Self::complete(self, job_id).await
    }

    async fn fail(&self, job_id: JobId, error: String) -> Result<()> {
        Self::fail(self, job_id, error).await
    }

    async fn reclaim_stalled(&self) -> Vec<StalledOutcome> {
        Self::reclaim_stalled(self).await
    }
}
