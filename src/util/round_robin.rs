use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared cursor dealing submissions across `n` queues in turn.
///
/// Padded to its own cache line: every submitting thread bumps it.
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: CachePadded<AtomicUsize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next slot in `0..n`. Wraps on overflow.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn next_index(&self, n: usize) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % n
    }
}
