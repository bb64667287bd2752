use super::{Pool, Shared};
use crate::config::Config;
use crate::error::Result;
use crate::executor::worker::{execute_task, shutdown_workers, spawn_workers, WorkerId};
use crate::executor::{Task, TaskHandle};
use crate::telemetry::MetricsSnapshot;
use crate::util::RoundRobin;
use std::sync::Arc;
use std::thread::JoinHandle;

/// One queue per worker, with stealing on both sides.
///
/// An idle worker sweeps every queue with a non-blocking pop, starting at its
/// own, before it blocks on its own queue. A producer sweeps
/// `push_fanout * num_threads` queues with a non-blocking push, starting at
/// the round robin slot, before it blocks on that slot. Order is FIFO per
/// queue only.
pub struct WorkStealingPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    next: RoundRobin,
    push_fanout: usize,
}

impl WorkStealingPool {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();
        let shared = Arc::new(Shared::new(num_threads));

        let worker_shared = shared.clone();
        let workers = spawn_workers(config, &shared.queues, move |id| {
            run_worker(id, &worker_shared);
        })?;

        tracing::info!(
            threads = num_threads,
            push_fanout = config.push_fanout,
            policy = "work-stealing",
            "pool started"
        );

        Ok(Self {
            shared,
            workers,
            next: RoundRobin::new(),
            push_fanout: config.push_fanout,
        })
    }

    pub fn with_threads(n: usize) -> Result<Self> {
        Self::new(&Config::with_threads(n))
    }

    pub fn push_fanout(&self) -> usize {
        self.push_fanout
    }

    /// Mark every queue finished without joining the workers.
    ///
    /// Workers drain what is already queued and then exit; the threads are
    /// joined on [`shutdown`](Pool::shutdown) or drop. A task submitted after
    /// this call only runs if the worker owning its queue has not exited yet,
    /// otherwise its handle reports [`Abandoned`](crate::TaskError::Abandoned)
    /// once the pool is dropped.
    pub fn wait(&self) {
        for queue in self.shared.queues.iter() {
            queue.finish();
        }
    }
}

fn run_worker(home: WorkerId, shared: &Shared) {
    let queues = &shared.queues;
    let n = queues.len();

    loop {
        let stolen = (0..n).find_map(|offset| {
            let idx = (home + offset) % n;
            queues[idx].try_pop().map(|task| (task, idx))
        });

        let task = match stolen {
            Some((task, idx)) => {
                if idx != home {
                    tracing::trace!(worker = home, from = idx, task = %task.id(), "stole task");
                    shared.metrics.record_task_stolen();
                }
                task
            }
            None => match queues[home].pop() {
                Some(task) => task,
                None => break,
            },
        };

        execute_task(task, &shared.metrics);
    }
}

impl Pool for WorkStealingPool {
    fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (mut task, handle) = Task::new(f);
        let queues = &self.shared.queues;
        let n = queues.len();
        let start = self.next.next_index(n);
        self.shared.metrics.record_task_submitted();

        for offset in 0..n * self.push_fanout {
            match queues[(start + offset) % n].try_push(task) {
                Ok(()) => return handle,
                Err(rejected) => task = rejected,
            }
        }

        tracing::trace!(shard = start, task = %task.id(), "all probes contended, waiting on lock");
        self.shared.metrics.record_push_fallback();
        queues[start].push(task);
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

impl Drop for WorkStealingPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkStealingPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkStealingPool")
            .field("num_threads", &self.num_threads())
            .field("push_fanout", &self.push_fanout)
            .field("queues", &self.shared.queues)
            .finish()
    }
}
