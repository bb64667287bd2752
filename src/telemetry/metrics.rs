//! Metrics collection for pool monitoring.

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// One hour in nanoseconds; longer executions are clamped.
const MAX_TRACKED_LATENCY_NS: u64 = 3_600_000_000_000;

/// Pool metrics collector
#[derive(Debug)]
pub struct Metrics {
    tasks_submitted: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_stolen: AtomicU64,
    tasks_panicked: AtomicU64,
    push_fallbacks: AtomicU64,

    // None if the histogram could not be allocated; latency is then not tracked.
    latency_histogram: Option<Mutex<Histogram<u64>>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        let latency_histogram = Histogram::new_with_max(MAX_TRACKED_LATENCY_NS, 3)
            .ok()
            .map(Mutex::new);

        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_stolen: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            push_fallbacks: AtomicU64::new(0),
            latency_histogram,
            start_time: Instant::now(),
        }
    }

    pub fn record_task_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a task execution with duration
    pub fn record_task_execution(&self, duration_ns: u64) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);

        // Workers never wait on the histogram
        if let Some(mut hist) = self.latency_histogram.as_ref().and_then(|h| h.try_lock()) {
            hist.saturating_record(duration_ns.min(MAX_TRACKED_LATENCY_NS));
        }
    }

    /// Record a task taken from a queue other than the worker's own
    pub fn record_task_stolen(&self) {
        self.tasks_stolen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_panic(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a submission that found every probed queue contended and had
    /// to wait for a lock
    pub fn record_push_fallback(&self) {
        self.push_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot {
            timestamp: Instant::now(),
            uptime: self.start_time.elapsed(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_stolen: self.tasks_stolen.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            push_fallbacks: self.push_fallbacks.load(Ordering::Relaxed),
            avg_latency_ns: 0,
            p50_latency_ns: 0,
            p99_latency_ns: 0,
            max_latency_ns: 0,
        };

        if let Some(hist) = &self.latency_histogram {
            let hist = hist.lock();
            if hist.len() > 0 {
                snapshot.avg_latency_ns = hist.mean() as u64;
                snapshot.p50_latency_ns = hist.value_at_quantile(0.50);
                snapshot.p99_latency_ns = hist.value_at_quantile(0.99);
                snapshot.max_latency_ns = hist.max();
            }
        }

        snapshot
    }

    pub fn reset(&self) {
        self.tasks_submitted.store(0, Ordering::Relaxed);
        self.tasks_executed.store(0, Ordering::Relaxed);
        self.tasks_stolen.store(0, Ordering::Relaxed);
        self.tasks_panicked.store(0, Ordering::Relaxed);
        self.push_fallbacks.store(0, Ordering::Relaxed);

        if let Some(hist) = &self.latency_histogram {
            hist.lock().reset();
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub timestamp: Instant,
    pub uptime: Duration,
    pub tasks_submitted: u64,
    /// Includes tasks that panicked.
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
    /// Tasks submitted but not yet executed
    pub fn pending(&self) -> u64 {
        self.tasks_submitted.saturating_sub(self.tasks_executed)
    }

    pub fn tasks_per_second(&self) -> f64 {
        let seconds = self.uptime.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.tasks_executed as f64 / seconds
    }
}
