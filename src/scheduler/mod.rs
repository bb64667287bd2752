//! Pool strategies.
//!
//! All three pools run a fixed set of OS threads over [`TaskQueue`]s and differ
//! only in how submissions are placed and how idle workers look for work:
//!
//! - [`SingleQueuePool`]: one shared queue, strict FIFO.
//! - [`ShardedPool`]: one queue per worker, round robin placement.
//! - [`WorkStealingPool`]: one queue per worker, with non-blocking probing on
//!   both the producer and the consumer side.

pub mod sharded;
pub mod single_queue;
pub mod work_stealing;

pub use sharded::ShardedPool;
pub use single_queue::SingleQueuePool;
pub use work_stealing::WorkStealingPool;

use crate::executor::{TaskHandle, TaskQueue};
use crate::telemetry::{Metrics, MetricsSnapshot};

/// A fixed-size pool of worker threads that runs submitted closures.
pub trait Pool {
    /// Queue `f` for execution and return the handle to its result.
    ///
    /// Arguments are passed by capturing them in the closure.
    fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;

    fn num_threads(&self) -> usize;

    fn metrics(&self) -> MetricsSnapshot;

    /// Finish every queue and join every worker. Tasks already queued run
    /// first. Idempotent.
    ///
    /// May run on one of the pool's own workers, when the last owner is
    /// dropped inside a task; that worker is then detached, not joined.
    fn shutdown(&mut self);
}

/// State shared between a pool and its workers.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) queues: Box<[TaskQueue]>,
    pub(crate) metrics: Metrics,
}

impl Shared {
    pub(crate) fn new(num_queues: usize) -> Self {
        Self {
            queues: (0..num_queues).map(|_| TaskQueue::new()).collect(),
            metrics: Metrics::new(),
        }
    }
}
