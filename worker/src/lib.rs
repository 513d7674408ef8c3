//! Worker pool capability: binds a [`Handler`] to a job queue and runs it
//! under a configurable concurrency budget.
//!
//! This is the C7 "Worker Pool" component: a set of pull-based loops that
//! claim work from an [`inkwell_queue::JobQueue`], run it, and report the
//! outcome back. Cancellation is cooperative and observer callbacks mirror
//! the job lifecycle (completed / failed / stalled / pool error) so a caller
//! can wire metrics or logging without reaching into the pool's internals.

mod context;
mod error;
mod handler;
mod pool;

pub use context::JobContext;
pub use error::{Result, WorkerError};
pub use handler::Handler;
pub use pool::{WorkerPool, WorkerPoolBuilder, WorkerPoolOptions};

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::{CoreError, ErrorKind};
    use inkwell_queue::{EnqueueOptions, InMemoryJobQueue, JobQueue, RetryPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    impl Handler<u32> for CountingHandler {
        async fn handle(&self, payload: u32, _ctx: JobContext) -> inkwell_core::Result<()> {
            self.calls.fetch_add(payload as usize, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn pool_drains_enqueued_jobs() {
        let queue = InMemoryJobQueue::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            calls: calls.clone(),
        };

        for payload in [1u32, 2, 3] {
            queue
                .enqueue("sum", payload, EnqueueOptions::default())
                .await
                .unwrap();
        }

        let pool = WorkerPoolBuilder::new(queue, handler)
            .options(WorkerPoolOptions {
                concurrency: 2,
                poll_interval: Duration::from_millis(10),
                stalled_check_interval: Duration::from_secs(60),
            })
            .build();
        pool.run();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 6);

        pool.shutdown(Duration::from_secs(1)).await.unwrap();
    }

    struct AlwaysFailsHandler;

    impl Handler<u32> for AlwaysFailsHandler {
        async fn handle(&self, _payload: u32, _ctx: JobContext) -> inkwell_core::Result<()> {
            Err(CoreError::new(ErrorKind::HandlerError, "boom").into())
        }
    }

    #[tokio::test]
    async fn failed_job_is_observed_and_eventually_exhausts_retries() {
        let queue = InMemoryJobQueue::<u32>::default();
        let job_id = queue
            .enqueue(
                "always-fails",
                1,
                EnqueueOptions {
                    retry: RetryPolicy {
                        attempts: 1,
                        ..RetryPolicy::default()
                    },
                    ..EnqueueOptions::default()
                },
            )
            .await
            .unwrap();

        let failures = Arc::new(AtomicUsize::new(0));
        let failures_clone = failures.clone();
        let pool = WorkerPoolBuilder::new(queue.clone(), AlwaysFailsHandler)
            .options(WorkerPoolOptions {
                concurrency: 1,
                poll_interval: Duration::from_millis(10),
                stalled_check_interval: Duration::from_secs(60),
            })
            .on_failed(move |_job_id, _msg| {
                failures_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build();
        pool.run();

        tokio::time::sleep(Duration::from_millis(100)).await;
        pool.shutdown(Duration::from_secs(1)).await.unwrap();

        assert_eq!(failures.load(Ordering::SeqCst), 1);
        let record = queue.get(job_id).await.unwrap();
        assert_eq!(record.state, inkwell_queue::JobState::Failed);
    }

    struct BlocksUntilCancelled;

    impl Handler<u32> for BlocksUntilCancelled {
        async fn handle(&self, _payload: u32, ctx: JobContext) -> inkwell_core::Result<()> {
            ctx.cancellation().cancelled().await;
            Err(CoreError::new(ErrorKind::Cancelled, "cancelled").into())
        }
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_job_context() {
        let queue = InMemoryJobQueue::<u32>::default();
        queue
            .enqueue("blocks", 1, EnqueueOptions::default())
            .await
            .unwrap();

        let pool = WorkerPoolBuilder::new(queue, BlocksUntilCancelled)
            .options(WorkerPoolOptions {
                concurrency: 1,
                poll_interval: Duration::from_millis(10),
                stalled_check_interval: Duration::from_secs(60),
            })
            .build();
        pool.run();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let result = pool.shutdown(Duration::from_secs(2)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn shutdown_reports_timeout_when_handler_ignores_cancellation() {
        struct NeverFinishes;
        impl Handler<u32> for NeverFinishes {
            async fn handle(&self, _payload: u32, _ctx: JobContext) -> inkwell_core::Result<()> {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }

        let queue = InMemoryJobQueue::<u32>::default();
        queue
            .enqueue("stuck", 1, EnqueueOptions::default())
            .await
            .unwrap();

        let pool = WorkerPoolBuilder::new(queue, NeverFinishes)
            .options(WorkerPoolOptions {
                concurrency: 1,
                poll_interval: Duration::from_millis(10),
                stalled_check_interval: Duration::from_secs(60),
            })
            .build();
        pool.run();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let result = pool.shutdown(Duration::from_millis(100)).await;
        assert!(matches!(result, Err(WorkerError::ShutdownTimeout(1))));
    }
}
