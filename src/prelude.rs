pub use crate::config::{Config, ConfigBuilder, SchedulingPolicy};
pub use crate::error::{Error, Result, TaskError};
pub use crate::executor::{TaskHandle, TaskQueue};
pub use crate::runtime::Runtime;
pub use crate::scheduler::{Pool, ShardedPool, SingleQueuePool, WorkStealingPool};
pub use crate::telemetry::MetricsSnapshot;
