//! Task representation and the result bridge between a worker and a caller.

use super::panic_handler::panic_message;
use crate::error::TaskError;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// How an invoked bridge finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Panicked,
}

type Slot<T> = thread::Result<T>;

/// A deferred computation wired to the write side of a one-shot result slot.
///
/// The bridge is the only writer of its slot. [`invoke`](Self::invoke)
/// consumes it, so the computation runs at most once; a bridge dropped
/// without being invoked leaves its [`TaskHandle`] to observe
/// [`TaskError::Abandoned`].
pub struct TaskBridge<F, T> {
    id: TaskId,
    source: F,
    result: Sender<Slot<T>>,
}

impl<F, T> TaskBridge<F, T>
where
    F: FnOnce() -> T,
{
    pub fn new(source: F) -> (Self, TaskHandle<T>) {
        let id = TaskId::next();
        let (result, slot) = bounded(1);
        let bridge = TaskBridge { id, source, result };
        (bridge, TaskHandle { id, slot })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Run the computation and publish its value or its panic.
    ///
    /// Never unwinds into the caller. If the handle is gone the outcome is
    /// dropped on the floor.
    pub fn invoke(self) -> TaskOutcome {
        let TaskBridge { id, source, result } = self;

        match catch_unwind(AssertUnwindSafe(source)) {
            Ok(value) => {
                publish(id, result, Ok(value));
                TaskOutcome::Completed
            }
            Err(payload) => {
                tracing::warn!(task = %id, reason = panic_message(payload.as_ref()), "task panicked");
                publish(id, result, Err(payload));
                TaskOutcome::Panicked
            }
        }
    }
}

// An unsent outcome is dropped here, and its drop can panic; keep that on this side.
fn publish<T>(id: TaskId, result: Sender<Slot<T>>, outcome: Slot<T>) {
    let sent = catch_unwind(AssertUnwindSafe(move || {
        let _ = result.send(outcome);
    }));
    if sent.is_err() {
        tracing::warn!(task = %id, "dropping an unclaimed result panicked");
    }
}

impl<F, T> fmt::Debug for TaskBridge<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskBridge").field("id", &self.id).finish()
    }
}

/// Object-safe view of a bridge, so queues can hold bridges of any result type.
pub(crate) trait Runnable: Send {
    fn run(self: Box<Self>) -> TaskOutcome;
}

impl<F, T> Runnable for TaskBridge<F, T>
where
    F: FnOnce() -> T + Send,
    T: Send,
{
    fn run(self: Box<Self>) -> TaskOutcome {
        (*self).invoke()
    }
}

/// Internal task representation: a type-erased [`TaskBridge`].
///
/// Move-only. A queue owns it until it is popped, then the popping worker
/// owns it until [`run`](Task::run) returns.
pub struct Task {
    id: TaskId,
    bridge: Box<dyn Runnable + 'static>,
}

impl Task {
    /// Create a task and the handle for its result.
    pub fn new<F, T>(f: F) -> (Self, TaskHandle<T>)
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (bridge, handle) = TaskBridge::new(f);
        let task = Task {
            id: bridge.id(),
            bridge: Box::new(bridge),
        };
        (task, handle)
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Execute the task
    pub fn run(self) -> TaskOutcome {
        self.bridge.run()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish()
    }
}

/// Read side of a task's result slot.
///
/// Awaiting it blocks until the paired bridge publishes, and yields either the
/// value or the captured panic, never both.
pub struct TaskHandle<T> {
    id: TaskId,
    slot: Receiver<Slot<T>>,
}

impl<T> TaskHandle<T> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Whether a result has been published and not yet taken.
    pub fn is_ready(&self) -> bool {
        !self.slot.is_empty()
    }

    /// Block until the task resolves.
    pub fn join(self) -> Result<T, TaskError> {
        match self.slot.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(TaskError::Panicked(payload)),
            Err(_) => Err(TaskError::Abandoned),
        }
    }

    /// Block until the task resolves, re-raising its panic on this thread.
    pub fn get(self) -> T {
        match self.join() {
            Ok(value) => value,
            Err(err) => err.resume(),
        }
    }

    /// Poll without blocking. `None` while the task is still pending.
    ///
    /// Once a result has been returned the slot is spent and later polls
    /// report [`TaskError::Abandoned`].
    pub fn try_join(&mut self) -> Option<Result<T, TaskError>> {
        match self.slot.try_recv() {
            Ok(Ok(value)) => Some(Ok(value)),
            Ok(Err(payload)) => Some(Err(TaskError::Panicked(payload))),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(TaskError::Abandoned)),
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("ready", &self.is_ready())
            .finish()
    }
}
