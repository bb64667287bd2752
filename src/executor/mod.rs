//! Task execution infrastructure.
//!
//! This module provides the core execution primitives: the task bridge that
//! carries a computation and its result slot, the blocking task queue, and
//! the worker thread plumbing shared by every pool.

pub mod panic_handler;
pub mod queue;
pub mod task;
pub(crate) mod worker;

pub use queue::TaskQueue;
pub use task::{Task, TaskBridge, TaskHandle, TaskId, TaskOutcome};
pub use worker::WorkerId;
