//! Pool telemetry.
//!
//! Every pool owns one [`Metrics`] collector that its workers feed. With the
//! `telemetry` feature disabled a no-op collector with the same API is used.

#[cfg(feature = "telemetry")]
pub mod metrics;

#[cfg(feature = "telemetry")]
pub use metrics::{Metrics, MetricsSnapshot};

// Stub implementations when telemetry is disabled
#[cfg(not(feature = "telemetry"))]
pub mod metrics {
    use std::time::{Duration, Instant};

    #[derive(Debug, Default)]
    pub struct Metrics;

    impl Metrics {
        pub fn new() -> Self { Self }
        pub fn record_task_submitted(&self) {}
        pub fn record_task_execution(&self, _: u64) {}
        pub fn record_task_stolen(&self) {}
        pub fn record_task_panic(&self) {}
        pub fn record_push_fallback(&self) {}
        pub fn reset(&self) {}
        pub fn snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                timestamp: Instant::now(),
                uptime: Duration::ZERO,
                tasks_submitted: 0,
                tasks_executed: 0,
                tasks_stolen: 0,
                tasks_panicked: 0,
                push_fallbacks: 0,
                avg_latency_ns: 0,
                p50_latency_ns: 0,
                p99_latency_ns: 0,
                max_latency_ns: 0,
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct MetricsSnapshot {
        pub timestamp: Instant,
        pub uptime: Duration,
        pub tasks_submitted: u64,
        pub tasks_executed: u64,
        pub tasks_stolen: u64,
        pub tasks_panicked: u64,
        pub push_fallbacks: u64,
        pub avg_latency_ns: u64,
        pub p50_latency_ns: u64,
        pub p99_latency_ns: u64,
        pub max_latency_ns: u64,
    }

    impl MetricsSnapshot {
        pub fn pending(&self) -> u64 {
            0
        }
    }
}

#[cfg(not(feature = "telemetry"))]
pub use metrics::{Metrics, MetricsSnapshot};
