use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use inkwell_core::ids::JobId;
use tokio::sync::Mutex;

use crate::error::{QueueError, Result};
use crate::model::{ClaimedJob, Counts, EnqueueOptions, JobRecord, JobState, Progress, StalledOutcome};

/// How long a claimed job may run without a heartbeat before it is
/// considered stalled and eligible for reclamation.
const DEFAULT_LEASE: Duration = Duration::from_secs(30);

/// How many times a job may be reclaimed from a stalled lease before it is
/// permanently failed with [`crate::error::QueueError::Stalled`].
const STALLED_BUDGET: u32 = 3;

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    priority: i32,
    delay_until: Instant,
    seq: u64,
    job_id: JobId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    /// Reversed so the waiting job with the lowest priority, earliest
    /// delay, and earliest enqueue time is the max-heap's top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.delay_until.cmp(&self.delay_until))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Entry<P> {
    record: JobRecord<P>,
    created_at: Instant,
    state_changed_at: Instant,
    lease_expires_at: Option<Instant>,
}

struct State<P> {
    next_seq: u64,
    heap: BinaryHeap<HeapEntry>,
    jobs: HashMap<JobId, Entry<P>>,
    dedup: HashMap<JobId, ()>,
    paused: bool,
    completed_order: HashMap<String, VecDeque<JobId>>,
    failed_order: HashMap<String, VecDeque<JobId>>,
}

impl<P> Default for State<P> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            heap: BinaryHeap::new(),
            jobs: HashMap::new(),
            dedup: HashMap::new(),
            paused: false,
            completed_order: HashMap::new(),
            failed_order: HashMap::new(),
        }
    }
}

/// An in-memory [`crate::JobQueue`]: a priority/delay-ordered binary heap
/// behind a `tokio::sync::Mutex`, matching the single-writer-per-call
/// pattern the workspace uses for other in-process shared state. Suitable
/// as the reference backend and for tests; a real deployment wants a
/// durable, process-external transport.
pub struct InMemoryJobQueue<P> {
    state: Arc<Mutex<State<P>>>,
    lease: Duration,
}

impl<P> Clone for InMemoryJobQueue<P> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            lease: self.lease,
        }
    }
}

impl<P: Clone + Send + Sync + 'static> Default for InMemoryJobQueue<P> {
    fn default() -> Self {
        Self::new(DEFAULT_LEASE)
    }
}

impl<P: Clone + Send + Sync + 'static> InMemoryJobQueue<P> {
    /// Creates an empty queue whose active-job lease expires after
    /// `lease_duration` without a heartbeat.
    #[must_use]
    pub fn new(lease_duration: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            lease: lease_duration,
        }
    }

    /// Enqueues a single job, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::DuplicateJobId`] if `opts.job_id` names a job
    /// still present in the queue.
    pub async fn enqueue(&self, name: &str, payload: P, opts: EnqueueOptions) -> Result<JobId> {
        let mut state = self.state.lock().await;
        let job_id = opts.job_id.unwrap_or_else(JobId::new);
        if state.jobs.contains_key(&job_id) {
            return Err(QueueError::DuplicateJobId(job_id));
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let now = Instant::now();
        let delay_until = now + opts.delay;

        state.heap.push(HeapEntry {
            priority: opts.priority,
            delay_until,
            seq,
            job_id,
        });
        state.dedup.insert(job_id, ());
        state.jobs.insert(
            job_id,
            Entry {
                record: JobRecord {
                    id: job_id,
                    name: name.to_string(),
                    payload,
                    attempts_made: 0,
                    stalled_count: 0,
                    opts,
                    state: JobState::Waiting,
                    progress: None,
                    last_error: None,
                },
                created_at: now,
                state_changed_at: now,
                lease_expires_at: None,
            },
        );

        tracing::debug!(job_id = %job_id, name, "enqueued job");
        Ok(job_id)
    }

    /// Enqueues many jobs, returning their ids in the same order.
    ///
    /// # Errors
    ///
    /// Fails on the first job whose `job_id` is a duplicate; jobs already
    /// enqueued earlier in the batch remain queued.
    pub async fn enqueue_bulk(
        &self,
        jobs: Vec<(String, P, EnqueueOptions)>,
    ) -> Result<Vec<JobId>> {
        let mut ids = Vec::with_capacity(jobs.len());
        for (name, payload, opts) in jobs {
            ids.push(self.enqueue(&name, payload, opts).await?);
        }
        Ok(ids)
    }

    /// Fetches a job's current record.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if no such job exists.
    pub async fn get(&self, job_id: JobId) -> Result<JobRecord<P>> {
        let state = self.state.lock().await;
        state
            .jobs
            .get(&job_id)
            .map(|entry| entry.record.clone())
            .ok_or(QueueError::NotFound(job_id))
    }

    /// Removes a job outright, regardless of its state.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if no such job exists.
    pub async fn remove(&self, job_id: JobId) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .jobs
            .remove(&job_id)
            .ok_or(QueueError::NotFound(job_id))?;
        state.dedup.remove(&job_id);
        Ok(())
    }

    /// Stops handing out new jobs from [`Self::claim`]. Jobs already
    /// claimed continue running.
    pub async fn pause(&self) {
        self.state.lock().await.paused = true;
    }

    /// Reopens the flow of jobs to [`Self::claim`].
    pub async fn resume(&self) {
        self.state.lock().await.paused = false;
    }

    /// Aggregate counts by state.
    pub async fn counts(&self) -> Counts {
        let state = self.state.lock().await;
        let mut counts = Counts {
            paused: state.paused,
            ..Counts::default()
        };
        for entry in state.jobs.values() {
            match entry.record.state {
                JobState::Waiting => counts.waiting += 1,
                JobState::Active => counts.active += 1,
                JobState::Completed => counts.completed += 1,
                JobState::Failed => counts.failed += 1,
                JobState::Delayed => counts.delayed += 1,
            }
        }
        counts
    }

    /// Removes up to `count` jobs in `state` whose last state change
    /// happened more than `older_than` ago. Returns how many were removed.
    pub async fn clean(&self, older_than: Duration, count: usize, target: JobState) -> usize {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let stale: Vec<JobId> = state
            .jobs
            .iter()
            .filter(|(_, entry)| {
                entry.record.state == target && now.duration_since(entry.state_changed_at) >= older_than
            })
            .map(|(id, _)| *id)
            .take(count)
            .collect();
        for id in &stale {
            state.jobs.remove(id);
            state.dedup.remove(id);
        }
        stale.len()
    }

    /// Claims the next eligible waiting job, transitioning it to `Active`.
    /// Returns `None` if the queue is paused or has no eligible job.
    pub async fn claim(&self) -> Option<ClaimedJob<P>> {
        let mut state = self.state.lock().await;
        if state.paused {
            return None;
        }

        let now = Instant::now();
        let mut deferred = Vec::new();
        let claimed = loop {
            let Some(top) = state.heap.pop() else {
                break None;
            };
            if top.delay_until > now {
                deferred.push(top);
                continue;
            }
            let Some(entry) = state.jobs.get_mut(&top.job_id) else {
                continue;
            };
            if entry.record.state != JobState::Waiting && entry.record.state != JobState::Delayed {
                continue;
            }
            entry.record.state = JobState::Active;
            entry.record.attempts_made += 1;
            entry.lease_expires_at = Some(now + self.lease);
            entry.state_changed_at = now;
            break Some(ClaimedJob {
                id: top.job_id,
                payload: entry.record.payload.clone(),
                attempts_made: entry.record.attempts_made,
            });
        };
        for entry in deferred {
            state.heap.push(entry);
        }
        claimed
    }

    /// Renews an active job's lease, preventing it from being reclaimed as
    /// stalled.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if no such job exists.
    pub async fn heartbeat(&self, job_id: JobId) -> Result<()> {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let lease = self.lease;
        let entry = state.jobs.get_mut(&job_id).ok_or(QueueError::NotFound(job_id))?;
        entry.lease_expires_at = Some(now + lease);
        Ok(())
    }

    /// Records a progress update. Never fails the caller if the job is
    /// gone; progress reporting is best-effort.
    pub async fn report_progress(&self, job_id: JobId, progress: Progress) {
        let mut state = self.state.lock().await;
        if let Some(entry) = state.jobs.get_mut(&job_id) {
            entry.record.progress = Some(progress);
        }
    }

    /// Marks a job completed and applies its `removeOnComplete` retention.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if no such job exists.
    pub async fn complete(&self, job_id: JobId) -> Result<()> {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let name = {
            let entry = state.jobs.get_mut(&job_id).ok_or(QueueError::NotFound(job_id))?;
            entry.record.state = JobState::Completed;
            entry.state_changed_at = now;
            entry.lease_expires_at = None;
            let retention = entry.record.opts.remove_on_complete;
            let name = entry.record.name.clone();
            let order = state.completed_order.entry(name.clone()).or_default();
            order.push_back(job_id);
            while order.len() > retention {
                if let Some(old) = order.pop_front() {
                    state.jobs.remove(&old);
                }
            }
            name
        };
        tracing::debug!(job_id = %job_id, name, "job completed");
        Ok(())
    }

    /// Fails a job's current attempt. Re-enqueues it with backoff if
    /// attempts remain, otherwise marks it permanently `Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::NotFound`] if no such job exists.
    pub async fn fail(&self, job_id: JobId, error: String) -> Result<()> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        let (retry, attempts_made, name) = {
            let entry = state.jobs.get_mut(&job_id).ok_or(QueueError::NotFound(job_id))?;
            entry.record.last_error = Some(error);
            entry.lease_expires_at = None;
            (
                entry.record.opts.retry,
                entry.record.attempts_made,
                entry.record.name.clone(),
            )
        };

        if attempts_made >= retry.attempts {
            return self.fail_permanently(&mut state, job_id, &name, now);
        }

        let delay = retry.backoff.delay_for(attempts_made);
        let seq = state.next_seq;
        state.next_seq += 1;
        let priority = {
            let entry = state.jobs.get_mut(&job_id).unwrap();
            entry.record.state = JobState::Delayed;
            entry.state_changed_at = now;
            entry.record.opts.priority
        };
        state.heap.push(HeapEntry {
            priority,
            delay_until: now + delay,
            seq,
            job_id,
        });
        tracing::debug!(job_id = %job_id, name, attempts_made, "job failed, retrying after backoff");
        Ok(())
    }

    fn fail_permanently(
        &self,
        state: &mut State<P>,
        job_id: JobId,
        name: &str,
        now: Instant,
    ) -> Result<()> {
        let retention = {
            let entry = state.jobs.get_mut(&job_id).ok_or(QueueError::NotFound(job_id))?;
            entry.record.state = JobState::Failed;
            entry.state_changed_at = now;
            entry.record.opts.remove_on_fail
        };
        let order = state.failed_order.entry(name.to_string()).or_default();
        order.push_back(job_id);
        while order.len() > retention {
            if let Some(old) = order.pop_front() {
                state.jobs.remove(&old);
            }
        }
        tracing::warn!(job_id = %job_id, name, "job permanently failed");
        Ok(())
    }

    /// Scans active jobs for expired leases, reclaiming stalled ones back
    /// to `Waiting` (or permanently failing them once their stalled budget
    /// is exhausted).
    pub async fn reclaim_stalled(&self) -> Vec<StalledOutcome> {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let stalled: Vec<JobId> = state
            .jobs
            .iter()
            .filter(|(_, entry)| {
                entry.record.state == JobState::Active
                    && entry.lease_expires_at.is_some_and(|expires| expires < now)
            })
            .map(|(id, _)| *id)
            .collect();

        let mut outcomes = Vec::with_capacity(stalled.len());
        for job_id in &stalled {
            let (stalled_count, priority, name) = {
                let entry = state.jobs.get_mut(job_id).unwrap();
                entry.record.stalled_count += 1;
                entry.lease_expires_at = None;
                (
                    entry.record.stalled_count,
                    entry.record.opts.priority,
                    entry.record.name.clone(),
                )
            };

            if stalled_count >= STALLED_BUDGET {
                let entry = state.jobs.get_mut(job_id).unwrap();
                entry.record.state = JobState::Failed;
                entry.record.last_error = Some(QueueError::Stalled(*job_id).to_string());
                entry.state_changed_at = now;
                tracing::warn!(job_id = %job_id, name, "job stalled past reclamation budget");
                outcomes.push(StalledOutcome::PermanentlyFailed(*job_id));
                continue;
            }

            let seq = state.next_seq;
            state.next_seq += 1;
            let entry = state.jobs.get_mut(job_id).unwrap();
            entry.record.state = JobState::Waiting;
            entry.state_changed_at = now;
            state.heap.push(HeapEntry {
                priority,
                delay_until: now,
                seq,
                job_id: *job_id,
            });
            tracing::debug!(job_id = %job_id, name, stalled_count, "reclaimed stalled job");
            outcomes.push(StalledOutcome::Reclaimed(*job_id));
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Backoff, RetryPolicy};

    #[tokio::test]
    async fn enqueue_then_claim_transitions_to_active() {
        let queue: InMemoryJobQueue<u32> = InMemoryJobQueue::default();
        let job_id = queue.enqueue("index-document", 42, EnqueueOptions::default()).await.unwrap();

        let claimed = queue.claim().await.unwrap();
        assert_eq!(claimed.id, job_id);
        assert_eq!(claimed.payload, 42);
        assert_eq!(claimed.attempts_made, 1);

        let record = queue.get(job_id).await.unwrap();
        assert_eq!(record.state, JobState::Active);
    }

    #[tokio::test]
    async fn claim_respects_priority_order() {
        let queue: InMemoryJobQueue<&str> = InMemoryJobQueue::default();
        let low = queue
            .enqueue("q", "low", EnqueueOptions { priority: 10, ..Default::default() })
            .await
            .unwrap();
        let high = queue
            .enqueue("q", "high", EnqueueOptions { priority: 1, ..Default::default() })
            .await
            .unwrap();

        let first = queue.claim().await.unwrap();
        assert_eq!(first.id, high);
        let second = queue.claim().await.unwrap();
        assert_eq!(second.id, low);
    }

    #[tokio::test]
    async fn claim_skips_jobs_whose_delay_has_not_elapsed() {
        let queue: InMemoryJobQueue<&str> = InMemoryJobQueue::default();
        queue
            .enqueue(
                "q",
                "later",
                EnqueueOptions { delay: Duration::from_secs(60), ..Default::default() },
            )
            .await
            .unwrap();
        let soon = queue.enqueue("q", "soon", EnqueueOptions::default()).await.unwrap();

        let claimed = queue.claim().await.unwrap();
        assert_eq!(claimed.id, soon);
        assert!(queue.claim().await.is_none());
    }

    #[tokio::test]
    async fn failed_job_is_requeued_with_backoff_until_attempts_exhausted() {
        let queue: InMemoryJobQueue<&str> = InMemoryJobQueue::default();
        let opts = EnqueueOptions {
            retry: RetryPolicy { attempts: 2, backoff: Backoff::Fixed { delay_ms: 0 } },
            ..Default::default()
        };
        let job_id = queue.enqueue("q", "payload", opts).await.unwrap();

        queue.claim().await.unwrap();
        queue.fail(job_id, "boom".to_string()).await.unwrap();
        assert_eq!(queue.get(job_id).await.unwrap().state, JobState::Delayed);

        queue.claim().await.unwrap();
        queue.fail(job_id, "boom again".to_string()).await.unwrap();
        assert_eq!(queue.get(job_id).await.unwrap().state, JobState::Failed);
    }

    #[tokio::test]
    async fn complete_trims_completed_history_past_retention() {
        let queue: InMemoryJobQueue<&str> = InMemoryJobQueue::default();
        let opts = EnqueueOptions { remove_on_complete: 1, ..Default::default() };
        let first = queue.enqueue("q", "a", opts.clone()).await.unwrap();
        let second = queue.enqueue("q", "b", opts).await.unwrap();

        queue.claim().await.unwrap();
        queue.complete(first).await.unwrap();
        queue.claim().await.unwrap();
        queue.complete(second).await.unwrap();

        assert!(queue.get(first).await.is_err());
        assert!(queue.get(second).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_job_id_is_rejected() {
        let queue: InMemoryJobQueue<&str> = InMemoryJobQueue::default();
        let opts = EnqueueOptions { job_id: Some(JobId::new()), ..Default::default() };
        queue.enqueue("q", "a", opts.clone()).await.unwrap();
        let err = queue.enqueue("q", "b", opts).await.unwrap_err();
        assert!(matches!(err, QueueError::DuplicateJobId(_)));
    }

    #[tokio::test]
    async fn reclaim_stalled_requeues_then_permanently_fails() {
        let queue: InMemoryJobQueue<&str> = InMemoryJobQueue::new(Duration::from_millis(0));
        let job_id = queue.enqueue("q", "payload", EnqueueOptions::default()).await.unwrap();

        let mut last_outcomes = Vec::new();
        for _ in 0..STALLED_BUDGET {
            queue.claim().await.unwrap();
            tokio::time::sleep(Duration::from_millis(1)).await;
            last_outcomes = queue.reclaim_stalled().await;
        }

        assert_eq!(queue.get(job_id).await.unwrap().state, JobState::Failed);
        assert!(matches!(
            last_outcomes.as_slice(),
            [StalledOutcome::PermanentlyFailed(_)]
        ));
    }

    #[tokio::test]
    async fn pause_stops_claims_until_resumed() {
        let queue: InMemoryJobQueue<&str> = InMemoryJobQueue::default();
        queue.enqueue("q", "payload", EnqueueOptions::default()).await.unwrap();

        queue.pause().await;
        assert!(queue.claim().await.is_none());

        queue.resume().await;
        assert!(queue.claim().await.is_some());
    }
}
