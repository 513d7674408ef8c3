use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use inkwell_core::ids::JobId;
use inkwell_queue::{JobQueue, Progress, StalledOutcome};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::context::JobContext;
use crate::error::{Result, WorkerError};
use crate::handler::Handler;

/// Tuning knobs for a [`WorkerPool`].
#[derive(Debug, Clone, Copy)]
pub struct WorkerPoolOptions {
    /// Number of jobs this pool runs concurrently.
    pub concurrency: usize,
    /// How long an idle worker sleeps between empty `claim` calls.
    pub poll_interval: Duration,
    /// How often the pool scans for stalled leases.
    pub stalled_check_interval: Duration,
}

impl Default for WorkerPoolOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            poll_interval: Duration::from_millis(250),
            stalled_check_interval: Duration::from_secs(5),
        }
    }
}

type CompletedObserver = Arc<dyn Fn(JobId) + Send + Sync>;
type FailedObserver = Arc<dyn Fn(JobId, &str) + Send + Sync>;
type StalledObserver = Arc<dyn Fn(StalledOutcome) + Send + Sync>;
type ErrorObserver = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Clone)]
struct Observers {
    on_completed: CompletedObserver,
    on_failed: FailedObserver,
    on_stalled: StalledObserver,
    on_error: ErrorObserver,
}

impl Default for Observers {
    fn default() -> Self {
        Self {
            on_completed: Arc::new(|_| {}),
            on_failed: Arc::new(|_, _| {}),
            on_stalled: Arc::new(|_| {}),
            on_error: Arc::new(|_| {}),
        }
    }
}

struct Inner<Q, H, P>
where
    Q: JobQueue<P>,
    H: Handler<P>,
{
    queue: Q,
    handler: H,
    opts: WorkerPoolOptions,
    cancel: CancellationToken,
    active: AtomicUsize,
    observers: Observers,
    handles: StdMutex<Vec<JoinHandle<()>>>,
    _marker: PhantomData<fn(P)>,
}

/// A concurrent pull-based worker pool: `concurrency` loops each repeatedly
/// claim a job from `Q`, run it through `H`, and report the outcome back to
/// the queue. A background loop periodically reclaims stalled leases.
///
/// Shutdown is cooperative: [`WorkerPool::shutdown`] signals cancellation to
/// every in-flight [`JobContext`] and waits for active jobs to finish up to a
/// timeout, rather than forcibly aborting handler futures.
pub struct WorkerPool<Q, H, P>
where
    Q: JobQueue<P>,
    H: Handler<P>,
{
    inner: Arc<Inner<Q, H, P>>,
}

impl<Q, H, P> Clone for WorkerPool<Q, H, P>
where
    Q: JobQueue<P>,
    H: Handler<P>,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Fluent builder for [`WorkerPool`]. Observer callbacks must be registered
/// here, before [`WorkerPoolBuilder::build`] hands out the pool.
pub struct WorkerPoolBuilder<Q, H, P>
where
    Q: JobQueue<P>,
    H: Handler<P>,
{
    queue: Q,
    handler: H,
    opts: WorkerPoolOptions,
    observers: Observers,
    _marker: PhantomData<fn(P)>,
}

impl<Q, H, P> WorkerPoolBuilder<Q, H, P>
where
    Q: JobQueue<P> + 'static,
    H: Handler<P> + 'static,
    P: Send + 'static,
{
    /// Starts building a pool bound to `queue` and `handler`.
    #[must_use]
    pub fn new(queue: Q, handler: H) -> Self {
        Self {
            queue,
            handler,
            opts: WorkerPoolOptions::default(),
            observers: Observers::default(),
            _marker: PhantomData,
        }
    }

    /// Overrides the default concurrency, poll interval, and stalled-check
    /// interval.
    #[must_use]
    pub fn options(mut self, opts: WorkerPoolOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Registers a callback invoked after a job completes successfully.
    #[must_use]
    pub fn on_completed(mut self, f: impl Fn(JobId) + Send + Sync + 'static) -> Self {
        self.observers.on_completed = Arc::new(f);
        self
    }

    /// Registers a callback invoked after a job's attempt fails (whether
    /// requeued for retry or permanently failed).
    #[must_use]
    pub fn on_failed(mut self, f: impl Fn(JobId, &str) + Send + Sync + 'static) -> Self {
        self.observers.on_failed = Arc::new(f);
        self
    }

    /// Registers a callback invoked for each stalled-lease outcome.
    #[must_use]
    pub fn on_stalled(mut self, f: impl Fn(StalledOutcome) + Send + Sync + 'static) -> Self {
        self.observers.on_stalled = Arc::new(f);
        self
    }

    /// Registers a callback invoked when the pool's bookkeeping calls back to
    /// the queue fail (distinct from a handler's own error).
    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.observers.on_error = Arc::new(f);
        self
    }

    /// Finalizes the pool. Call [`WorkerPool::run`] to start it.
    #[must_use]
    pub fn build(self) -> WorkerPool<Q, H, P> {
        WorkerPool {
            inner: Arc::new(Inner {
                queue: self.queue,
                handler: self.handler,
                opts: self.opts,
                cancel: CancellationToken::new(),
                active: AtomicUsize::new(0),
                observers: self.observers,
                handles: StdMutex::new(Vec::new()),
                _marker: PhantomData,
            }),
        }
    }
}

impl<Q, H, P> WorkerPool<Q, H, P>
where
    Q: JobQueue<P> + 'static,
    H: Handler<P> + 'static,
    P: Send + 'static,
{
    /// Spawns `concurrency` claim-execute loops plus one stalled-lease
    /// reclamation loop. Returns immediately; the loops run until
    /// [`Self::shutdown`] is called and dropped work is joined there.
    pub fn run(&self) {
        let mut handles = self.inner.handles.lock().unwrap();
        for worker_id in 0..self.inner.opts.concurrency.max(1) {
            let inner = self.inner.clone();
            handles.push(tokio::spawn(
                worker_loop(inner).instrument(tracing::info_span!("worker", worker_id)),
            ));
        }
        let inner = self.inner.clone();
        handles.push(tokio::spawn(reclaim_loop(inner)));
    }

    /// Pauses the underlying queue: running jobs finish, but no new ones are
    /// claimed until [`Self::resume`].
    pub async fn pause(&self) {
        self.inner.queue.pause().await;
    }

    /// Reopens the flow of jobs from the underlying queue.
    pub async fn resume(&self) {
        self.inner.queue.resume().await;
    }

    /// Signals cancellation to every active [`JobContext`] and waits up to
    /// `timeout` for in-flight jobs to finish, then joins all background
    /// loops.
    ///
    /// # Errors
    /// Returns [`WorkerError::ShutdownTimeout`] if jobs are still active when
    /// `timeout` elapses; the loops are joined (aborted) regardless.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        self.inner.cancel.cancel();
        let waited = tokio::time::timeout(timeout, self.wait_idle()).await;

        let handles = std::mem::take(&mut *self.inner.handles.lock().unwrap());
        for handle in handles {
            handle.abort();
        }

        waited.map_err(|_| WorkerError::ShutdownTimeout(self.inner.active.load(Ordering::SeqCst)))
    }

    async fn wait_idle(&self) {
        while self.inner.active.load(Ordering::SeqCst) != 0 {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }
}

async fn worker_loop<Q, H, P>(inner: Arc<Inner<Q, H, P>>)
where
    Q: JobQueue<P> + 'static,
    H: Handler<P> + 'static,
    P: Send + 'static,
{
    loop {
        if inner.cancel.is_cancelled() {
            return;
        }

        let claimed = inner.queue.claim().await;
        let Some(claimed) = claimed else {
            tokio::select! {
                () = tokio::time::sleep(inner.opts.poll_interval) => {}
                () = inner.cancel.cancelled() => return,
            }
            continue;
        };

        inner.active.fetch_add(1, Ordering::SeqCst);
        run_one(&inner, claimed.id, claimed.payload).await;
        inner.active.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_one<Q, H, P>(inner: &Arc<Inner<Q, H, P>>, job_id: JobId, payload: P)
where
    Q: JobQueue<P> + 'static,
    H: Handler<P> + 'static,
    P: Send + 'static,
{
    let child_token = inner.cancel.child_token();
    let sink_inner = inner.clone();
    let progress_sink: Arc<
        dyn Fn(Progress) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync,
    > = Arc::new(move |progress: Progress| {
        let sink_inner = sink_inner.clone();
        Box::pin(async move {
            sink_inner.queue.report_progress(job_id, progress).await;
        })
    });
    let ctx = JobContext::new(job_id, child_token, progress_sink);

    let outcome = inner.handler.handle(payload, ctx).await;

    match outcome {
        Ok(()) => {
            if let Err(e) = inner.queue.complete(job_id).await {
                (inner.observers.on_error)(&e.to_string());
            }
            (inner.observers.on_completed)(job_id);
        }
        Err(e) => {
            let message = e.to_string();
            if let Err(queue_err) = inner.queue.fail(job_id, message.clone()).await {
                (inner.observers.on_error)(&queue_err.to_string());
            }
            (inner.observers.on_failed)(job_id, &message);
        }
    }
}

async fn reclaim_loop<Q, H, P>(inner: Arc<Inner<Q, H, P>>)
where
    Q: JobQueue<P> + 'static,
    H: Handler<P> + 'static,
    P: Send + 'static,
{
    loop {
        tokio::select! {
            () = tokio::time::sleep(inner.opts.stalled_check_interval) => {}
            () = inner.cancel.cancelled() => return,
        }
        for outcome in inner.queue.reclaim_stalled().await {
            (inner.observers.on_stalled)(outcome);
        }
    }
}
