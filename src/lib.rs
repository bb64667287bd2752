//! drift - blocking task pools over condition-variable queues
//!
//! A small task-execution core: submit a closure to a pool of OS worker
//! threads and get back a [`TaskHandle`] that yields its value, or the panic
//! it raised, once it has run.
//!
//! # Quick Start
//!
//! ```no_run
//! use drift_rs::prelude::*;
//!
//! let pool = WorkStealingPool::with_threads(4).unwrap();
//!
//! let handles: Vec<_> = (0u64..100).map(|i| pool.submit(move || i * i)).collect();
//! let sum: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
//!
//! assert_eq!(sum, 328_350);
//! ```
//!
//! # Pools
//!
//! - **[`SingleQueuePool`]**: every worker pops one shared queue; strict FIFO
//! - **[`ShardedPool`]**: a queue per worker, submissions dealt round robin
//! - **[`WorkStealingPool`]**: a queue per worker; idle workers take work from
//!   other queues and producers skip queues whose lock is busy
//!
//! All three start their threads on construction and, when dropped, let the
//! queued work finish before joining the threads.
//!
//! # Panics in tasks
//!
//! A panicking task never takes its worker down. The payload travels to the
//! handle unchanged: [`TaskHandle::join`] returns it as
//! [`TaskError::Panicked`], [`TaskHandle::get`] resumes it on the caller.

// Lint configuration
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod runtime;
pub mod scheduler;
pub mod telemetry;
pub mod util;

// Re-export key types at crate root
pub use config::{Config, ConfigBuilder, SchedulingPolicy};
pub use error::{Error, Result, TaskError};
pub use executor::{TaskHandle, TaskQueue};
pub use runtime::Runtime;
pub use scheduler::{Pool, ShardedPool, SingleQueuePool, WorkStealingPool};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_submit() {
        let pool = SingleQueuePool::with_threads(2).unwrap();
        let handle = pool.submit(|| "hello".len());
        assert_eq!(handle.join().unwrap(), 5);
    }

    #[test]
    fn test_panic_does_not_kill_worker() {
        let pool = ShardedPool::with_threads(1).unwrap();

        let bad = pool.submit(|| -> u8 { panic!("worker must survive this") });
        assert!(bad.join().unwrap_err().is_panic());

        let good = pool.submit(|| 7u8);
        assert_eq!(good.join().unwrap(), 7);
    }
}
