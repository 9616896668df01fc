//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Batches handed to the subscribers
    batch_count: AtomicU64,
    /// Commands contained in those batches
    command_count: AtomicU64,
    /// Total successful sink writes
    write_count: AtomicU64,
    /// Total sink write failures
    failure_count: AtomicU64,
    /// Subscribers skipped because their sink was released
    released_count: AtomicU64,
    /// Commands dropped because input ended inside a block
    discarded_count: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_count(&self) -> u64 {
        self.batch_count.load(Ordering::Relaxed)
    }

    /// Count one delivered batch of `commands` commands
    pub fn inc_batch(&self, commands: usize) {
        self.batch_count.fetch_add(1, Ordering::Relaxed);
        self.command_count
            .fetch_add(commands as u64, Ordering::Relaxed);
    }

    pub fn command_count(&self) -> u64 {
        self.command_count.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn released_count(&self) -> u64 {
        self.released_count.load(Ordering::Relaxed)
    }

    pub fn add_released(&self, count: usize) {
        self.released_count
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn discarded_count(&self) -> u64 {
        self.discarded_count.load(Ordering::Relaxed)
    }

    pub fn add_discarded(&self, count: usize) {
        self.discarded_count
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batch_count: self.batch_count(),
            command_count: self.command_count(),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            released_count: self.released_count(),
            discarded_count: self.discarded_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batch_count: u64,
    pub command_count: u64,
    pub write_count: u64,
    pub failure_count: u64,
    pub released_count: u64,
    pub discarded_count: u64,
}
