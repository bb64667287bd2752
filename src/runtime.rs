use crate::config::{Config, SchedulingPolicy};
use crate::error::Result;
use crate::executor::TaskHandle;
use crate::scheduler::{Pool, ShardedPool, SingleQueuePool, WorkStealingPool};
use crate::telemetry::MetricsSnapshot;

/// A pool whose strategy is picked by [`Config::scheduling_policy`].
#[derive(Debug)]
pub enum Runtime {
    SingleQueue(SingleQueuePool),
    Sharded(ShardedPool),
    WorkStealing(WorkStealingPool),
}

impl Runtime {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let runtime = match config.scheduling_policy {
            SchedulingPolicy::SingleQueue => Runtime::SingleQueue(SingleQueuePool::new(&config)?),
            SchedulingPolicy::Sharded => Runtime::Sharded(ShardedPool::new(&config)?),
            SchedulingPolicy::WorkStealing => {
                Runtime::WorkStealing(WorkStealingPool::new(&config)?)
            }
        };
        Ok(runtime)
    }

    pub fn policy(&self) -> SchedulingPolicy {
        match self {
            Runtime::SingleQueue(_) => SchedulingPolicy::SingleQueue,
            Runtime::Sharded(_) => SchedulingPolicy::Sharded,
            Runtime::WorkStealing(_) => SchedulingPolicy::WorkStealing,
        }
    }
}

impl Pool for Runtime {
    fn submit<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        match self {
            Runtime::SingleQueue(pool) => pool.submit(f),
            Runtime::Sharded(pool) => pool.submit(f),
            Runtime::WorkStealing(pool) => pool.submit(f),
        }
    }

    fn num_threads(&self) -> usize {
        match self {
            Runtime::SingleQueue(pool) => pool.num_threads(),
            Runtime::Sharded(pool) => pool.num_threads(),
            Runtime::WorkStealing(pool) => pool.num_threads(),
        }
    }

    fn metrics(&self) -> MetricsSnapshot {
        match self {
            Runtime::SingleQueue(pool) => pool.metrics(),
            Runtime::Sharded(pool) => pool.metrics(),
            Runtime::WorkStealing(pool) => pool.metrics(),
        }
    }

    fn shutdown(&mut self) {
        match self {
            Runtime::SingleQueue(pool) => pool.shutdown(),
            Runtime::Sharded(pool) => pool.shutdown(),
            Runtime::WorkStealing(pool) => pool.shutdown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_selects_pool() {
        for policy in [
            SchedulingPolicy::SingleQueue,
            SchedulingPolicy::Sharded,
            SchedulingPolicy::WorkStealing,
        ] {
            let config = Config::builder()
                .num_threads(2)
                .scheduling_policy(policy)
                .build()
                .unwrap();
            let rt = Runtime::new(config).unwrap();

            assert_eq!(rt.policy(), policy);
            assert_eq!(rt.num_threads(), 2);
            assert_eq!(rt.submit(|| 21 * 2).join().unwrap(), 42);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            num_threads: Some(0),
            ..Config::default()
        };
        assert!(Runtime::new(config).is_err());
    }

    #[test]
    fn test_metrics_track_submissions() {
        let mut rt = Runtime::new(Config::with_threads(2)).unwrap();
        let handles: Vec<_> = (0..10).map(|i| rt.submit(move || i)).collect();
        for h in handles {
            h.join().unwrap();
        }
        rt.shutdown();

        #[cfg(feature = "telemetry")]
        {
            let snapshot = rt.metrics();
            assert_eq!(snapshot.tasks_submitted, 10);
            assert_eq!(snapshot.tasks_executed, 10);
            assert_eq!(snapshot.pending(), 0);
        }
    }
}
