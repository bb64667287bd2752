use super::{Pool, Shared};
use crate::config::Config;
use crate::error::Result;
use crate::executor::worker::{execute_task, shutdown_workers, spawn_workers};
use crate::executor::{Task, TaskHandle};
use crate::telemetry::MetricsSnapshot;
use crate::util::RoundRobin;
use std::sync::Arc;
use std::thread::JoinHandle;

/// One queue per worker; worker `i` only ever pops queue `i`.
///
/// Submissions are dealt round robin. There is no rebalancing: a run of slow
/// tasks on one shard delays everything behind it even while other workers
/// are idle.
pub struct ShardedPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    next: RoundRobin,
}

impl ShardedPool {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        let shared = Arc::new(Shared::new(num_threads));

        let worker_shared = shared.clone();
        let workers = spawn_workers(config, &shared.queues, move |id| {
            let queue = &worker_shared.queues[id];
            while let Some(task) = queue.pop() {
                execute_task(task, &worker_shared.metrics);
            }
        })?;

        tracing::info!(threads = num_threads, policy = "sharded", "pool started");

        Ok(Self {
            shared,
            workers,
            next: RoundRobin::new(),
        })
    }

    pub fn with_threads(n: usize) -> Result<Self> {
        Self::new(&Config::with_threads(n))
    }
}

impl Pool for ShardedPool {
    fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (task, handle) = Task::new(f);
        let shard = self.next.next_index(self.shared.queues.len());
        self.shared.metrics.record_task_submitted();
        self.shared.queues[shard].push(task);
        handle
    }

    fn num_threads(&self) -> usize {
        self.shared.queues.len()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    fn shutdown(&mut self) {
        shutdown_workers(&self.shared.queues, &mut self.workers);
    }
}

impl Drop for ShardedPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ShardedPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedPool")
            .field("num_threads", &self.num_threads())
            .field("queues", &self.shared.queues)
            .finish()
    }
}
