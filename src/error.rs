use crate::executor::panic_handler::panic_message;
use std::any::Any;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Task(#[from] TaskError),

    /// A worker thread could not be spawned.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}

/// Failure observed through a [`TaskHandle`](crate::executor::TaskHandle).
#[derive(thiserror::Error)]
pub enum TaskError {
    /// The computation panicked. The payload is the value it panicked with.
    #[error("task panicked: {}", panic_message(.0.as_ref()))]
    Panicked(Box<dyn Any + Send + 'static>),

    /// The task was dropped before it ran, so no result was ever published.
    #[error("task was dropped before it ran")]
    Abandoned,
}

impl TaskError {
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked(_))
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, TaskError::Abandoned)
    }

    /// Borrow the panic payload as `E`, if this is a panic carrying an `E`.
    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        match self {
            TaskError::Panicked(payload) => payload.downcast_ref::<E>(),
            TaskError::Abandoned => None,
        }
    }

    /// Take the panic payload.
    ///
    /// # Panics
    ///
    /// Panics if the task was abandoned rather than panicked.
    pub fn into_panic(self) -> Box<dyn Any + Send + 'static> {
        match self {
            TaskError::Panicked(payload) => payload,
            TaskError::Abandoned => panic!("task was abandoned, there is no panic payload"),
        }
    }

    pub fn try_into_panic(self) -> std::result::Result<Box<dyn Any + Send + 'static>, TaskError> {
        match self {
            TaskError::Panicked(payload) => Ok(payload),
            other => Err(other),
        }
    }

    /// Re-raise on the current thread: the original payload for a panic,
    /// a descriptive panic for an abandoned task.
    pub fn resume(self) -> ! {
        match self {
            TaskError::Panicked(payload) => std::panic::resume_unwind(payload),
            TaskError::Abandoned => panic!("task was dropped before it ran"),
        }
    }
}

impl fmt::Debug for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Panicked(payload) => f
                .debug_tuple("Panicked")
                .field(&panic_message(payload.as_ref()))
                .finish(),
            TaskError::Abandoned => f.write_str("Abandoned"),
        }
    }
}
