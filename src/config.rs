use crate::error::{Error, Result};

const MAX_THREADS: usize = 1024;
const MIN_STACK_SIZE: usize = 16 * 1024;

/// Which queue layout a [`Runtime`](crate::Runtime) is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingPolicy {
    /// All workers share one queue. Strict FIFO across the pool.
    SingleQueue,
    /// One queue per worker, submissions dealt round robin, no stealing.
    Sharded,
    /// One queue per worker; idle workers steal and producers skip busy queues.
    #[default]
    WorkStealing,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Worker count. `None` means one per logical CPU.
    pub num_threads: Option<usize>,
    pub scheduling_policy: SchedulingPolicy,
    /// How many rounds over all queues a work-stealing submission probes
    /// with a non-blocking push before it waits on a lock.
    pub push_fanout: usize,
    pub pin_workers: bool,
    pub stack_size: Option<usize>,
    pub thread_name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: None,
            scheduling_policy: SchedulingPolicy::default(),
            push_fanout: 2,
            pin_workers: false,
            stack_size: Some(2 * 1024 * 1024),
            thread_name_prefix: "drift-worker".to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Default config with an explicit worker count.
    pub fn with_threads(n: usize) -> Self {
        Self {
            num_threads: Some(n),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_threads {
            if n == 0 {
                return Err(Error::config("num_threads must be > 0"));
            }
            if n > MAX_THREADS {
                return Err(Error::config(format!(
                    "num_threads too large (max {})",
                    MAX_THREADS
                )));
            }
        }

        if self.push_fanout == 0 {
            return Err(Error::config("push_fanout must be > 0"));
        }

        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(Error::config(format!(
                    "stack_size must be at least {} bytes",
                    MIN_STACK_SIZE
                )));
            }
        }

        if self.thread_name_prefix.is_empty() {
            return Err(Error::config("thread_name_prefix must not be empty"));
        }

        Ok(())
    }

    pub fn worker_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get)
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn num_threads(mut self, n: usize) -> Self {
        self.config.num_threads = Some(n);
        self
    }

    pub fn scheduling_policy(mut self, policy: SchedulingPolicy) -> Self {
        self.config.scheduling_policy = policy;
        self
    }

    pub fn push_fanout(mut self, k: usize) -> Self {
        self.config.push_fanout = k;
        self
    }

    pub fn pin_workers(mut self, pin: bool) -> Self {
        self.config.pin_workers = pin;
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
