use super::task::{Task, TaskHandle};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

pub(crate) struct QueueState {
    tasks: VecDeque<Task>,
    finished: bool,
}

/// FIFO of tasks guarded by a mutex and a condition variable.
///
/// The `try_*` operations never wait for the lock: if another thread holds it
/// they report failure immediately, which lets a caller move on to a different
/// queue. Once [`finish`](Self::finish) has been called, [`pop`](Self::pop)
/// still drains whatever is queued and then returns `None` instead of waiting.
pub struct TaskQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                finished: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Mark the queue finished and wake every waiter. Idempotent.
    pub fn finish(&self) {
        self.state.lock().finished = true;
        self.ready.notify_all();
    }

    /// Take the front task if the lock is free and the queue is non-empty.
    pub fn try_pop(&self) -> Option<Task> {
        self.state.try_lock()?.tasks.pop_front()
    }

    /// Take the front task, waiting while the queue is empty and not finished.
    ///
    /// Returns `None` only once the queue is both finished and empty.
    pub fn pop(&self) -> Option<Task> {
        let mut state = self.state.lock();
        while state.tasks.is_empty() && !state.finished {
            self.ready.wait(&mut state);
        }
        state.tasks.pop_front()
    }

    /// Append `task` if the lock is free; hands it back on contention.
    pub fn try_push(&self, task: Task) -> Result<(), Task> {
        match self.state.try_lock() {
            Some(mut state) => {
                state.tasks.push_back(task);
                drop(state);
                self.ready.notify_one();
                Ok(())
            }
            None => Err(task),
        }
    }

    /// Append `task`, waiting for the lock if necessary.
    pub fn push(&self, task: Task) {
        self.state.lock().tasks.push_back(task);
        self.ready.notify_one();
    }

    /// Wrap `f` in a task and append it without waiting for the lock.
    ///
    /// On contention `f` is returned untouched.
    pub fn try_spawn<F, T>(&self, f: F) -> Result<TaskHandle<T>, F>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let Some(mut state) = self.state.try_lock() else {
            return Err(f);
        };
        let (task, handle) = Task::new(f);
        state.tasks.push_back(task);
        drop(state);
        self.ready.notify_one();
        Ok(handle)
    }

    /// Wrap `f` in a task and append it.
    pub fn spawn<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (task, handle) = Task::new(f);
        self.push(task);
        handle
    }

    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().tasks.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().finished
    }

    /// Hold the queue lock, making every `try_*` call on this queue fail.
    #[cfg(test)]
    pub(crate) fn lock_for_test(&self) -> parking_lot::MutexGuard<'_, QueueState> {
        self.state.lock()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state.try_lock() {
            Some(state) => f
                .debug_struct("TaskQueue")
                .field("len", &state.tasks.len())
                .field("finished", &state.finished)
                .finish(),
            None => f.debug_struct("TaskQueue").finish_non_exhaustive(),
        }
    }
}
