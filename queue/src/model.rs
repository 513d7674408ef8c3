use std::time::Duration;

use inkwell_core::ids::JobId;
use inkwell_core::types::Metadata;

/// How the delay before a retry grows with each attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed {
        /// Delay before each retry.
        delay_ms: u64,
    },
    /// Delay doubles with each attempt, starting from `initial_delay_ms`.
    Exponential {
        /// Delay before the first retry.
        initial_delay_ms: u64,
    },
}

impl Backoff {
    /// The delay before the retry following `attempts_made` prior attempts.
    #[must_use]
    pub fn delay_for(self, attempts_made: u32) -> Duration {
        match self {
            Self::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Self::Exponential { initial_delay_ms } => {
                Duration::from_millis(initial_delay_ms.saturating_mul(1u64 << attempts_made.min(20)))
            }
        }
    }
}

/// A job's retry policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub attempts: u32,
    /// Delay strategy between attempts.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Backoff::Exponential {
                initial_delay_ms: 1000,
            },
        }
    }
}

/// Options accepted by [`crate::JobQueue::enqueue`].
#[derive(Debug, Clone)]
pub struct EnqueueOptions {
    /// Lower values run sooner. Default `0`.
    pub priority: i32,
    /// How long to wait before the job becomes eligible to run.
    pub delay: Duration,
    /// Retry policy applied on handler failure.
    pub retry: RetryPolicy,
    /// A caller-supplied id, used to deduplicate enqueue calls (re-enqueuing
    /// the same `documentId` for example). `None` generates a fresh id.
    pub job_id: Option<JobId>,
    /// How many completed jobs with this name to retain before trimming.
    pub remove_on_complete: usize,
    /// How many failed jobs with this name to retain before trimming.
    pub remove_on_fail: usize,
}

impl Default for EnqueueOptions {
    fn default() -> Self {
        Self {
            priority: 0,
            delay: Duration::ZERO,
            retry: RetryPolicy::default(),
            job_id: None,
            remove_on_complete: 100,
            remove_on_fail: 500,
        }
    }
}

/// A progress update reported by a running handler.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Completion percentage, `0..=100`.
    pub percent: u8,
    /// Human-readable status message.
    pub message: String,
    /// Free-form structured detail.
    pub meta: Option<Metadata>,
}

impl Progress {
    /// Builds a progress update with no metadata.
    #[must_use]
    pub fn new(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent,
            message: message.into(),
            meta: None,
        }
    }
}

/// A job's position in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Eligible to run once its delay elapses, not yet claimed.
    Waiting,
    /// Claimed by a worker and currently running.
    Active,
    /// Finished without error.
    Completed,
    /// Exhausted retries, or was permanently stalled.
    Failed,
    /// Waiting for a retry delay to elapse after a failed attempt.
    Delayed,
}

/// A stored job and its queue bookkeeping.
#[derive(Debug, Clone)]
pub struct JobRecord<P> {
    /// This job's identifier.
    pub id: JobId,
    /// The queue name this job was enqueued under.
    pub name: String,
    /// The handler's input.
    pub payload: P,
    /// How many attempts have been made so far, including the active one.
    pub attempts_made: u32,
    /// How many times this job has been reclaimed from a stalled lease.
    pub stalled_count: u32,
    /// The options it was enqueued with.
    pub opts: EnqueueOptions,
    /// Current lifecycle state.
    pub state: JobState,
    /// The most recently reported progress, if any.
    pub progress: Option<Progress>,
    /// The error message from the most recent failed attempt, if any.
    pub last_error: Option<String>,
}

/// Aggregate counts across a queue's jobs, by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Jobs ready to run once claimed.
    pub waiting: usize,
    /// Jobs currently being handled.
    pub active: usize,
    /// Jobs that finished successfully.
    pub completed: usize,
    /// Jobs that exhausted retries or stalled out.
    pub failed: usize,
    /// Jobs waiting for a delay or retry backoff to elapse.
    pub delayed: usize,
    /// Whether the queue is currently paused.
    pub paused: bool,
}

/// The outcome of reclaiming one stalled job, returned by
/// [`crate::InMemoryJobQueue::reclaim_stalled`] so callers can drive
/// observer callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalledOutcome {
    /// The job was returned to `Waiting` for another attempt.
    Reclaimed(JobId),
    /// The job exhausted its stalled-reclamation budget and is now
    /// permanently `Failed`.
    PermanentlyFailed(JobId),
}

/// A job handed to a worker by [`crate::JobQueue::claim`].
#[derive(Debug, Clone)]
pub struct ClaimedJob<P> {
    /// The job's identifier.
    pub id: JobId,
    /// The handler's input.
    pub payload: P,
    /// How many attempts have been made so far, including this one.
    pub attempts_made: u32,
}
