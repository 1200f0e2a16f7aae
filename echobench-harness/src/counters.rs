use std::sync::atomic::{AtomicU64, Ordering};

/// Run-wide call counters, incremented concurrently by every worker.
#[derive(Debug, Default)]
pub struct GlobalCounters {
    attempted: AtomicU64,
    succeeded: AtomicU64,
}

/// Counter values read once the run has completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub attempted: u64,
    pub succeeded: u64,
}

impl GlobalCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one call that returned the success marker.
    pub fn record_success(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            attempted: self.attempted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
        }
    }
}
