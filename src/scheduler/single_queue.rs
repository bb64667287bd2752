use super::{Pool, Shared};
use crate::config::Config;
use crate::error::Result;
use crate::executor::worker::{execute_task, shutdown_workers, spawn_workers};
use crate::executor::{Task, TaskHandle};
use crate::telemetry::MetricsSnapshot;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Every worker blocks on the same queue.
///
/// Tasks start in submission order; with a single worker they also finish in
/// submission order. The one queue lock is shared by every producer and
/// consumer.
pub struct SingleQueuePool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    num_threads: usize,
}

impl SingleQueuePool {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        let shared = Arc::new(Shared::new(1));

        let worker_shared = shared.clone();
        let workers = spawn_workers(config, &shared.queues, move |_| {
            let queue = &worker_shared.queues[0];
            while let Some(task) = queue.pop() {
                execute_task(task, &worker_shared.metrics);
            }
        })?;

        tracing::info!(threads = num_threads, policy = "single-queue", "pool started");

        Ok(Self {
            shared,
            workers,
            num_threads,
        })
    }

    pub fn with_threads(n: usize) -> Result<Self> {
        Self::new(&Config::with_threads(n))
    }
}

impl Pool for SingleQueuePool {
    fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (task, handle) = Task::new(f);
        self.shared.metrics.record_task_submitted();
        self.shared.queues[0].push(task);
        handle
    }

    fn num_threads(&self) -> usize {
        self.num_threads
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    fn shutdown(&mut self) {
        shutdown_workers(&self.shared.queues, &mut self.workers);
    }
}

impl Drop for SingleQueuePool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SingleQueuePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleQueuePool")
            .field("num_threads", &self.num_threads)
            .field("queue", &self.shared.queues[0])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_sum_of_squares() {
        let pool = SingleQueuePool::with_threads(4).unwrap();
        let handles: Vec<_> = (0..100u64).map(|i| pool.submit(move || i * i)).collect();
        let sum: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(sum, 328_350);
    }

    #[test]
    fn test_single_worker_preserves_order() {
        let pool = SingleQueuePool::with_threads(1).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let log = log.clone();
                pool.submit(move || log.lock().push(i))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(*log.lock(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut pool = SingleQueuePool::with_threads(2).unwrap();
        let handle = pool.submit(|| "before shutdown");
        pool.shutdown();
        pool.shutdown();
        assert_eq!(handle.join().unwrap(), "before shutdown");
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(SingleQueuePool::with_threads(0).is_err());
    }
}
