use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of [`Metrics`] at a point in time, cheap to copy and return by
/// value from `Fifo::metrics()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total bytes successfully written (best-effort + all-or-nothing).
    pub bytes_written: u64,
    /// Total bytes successfully read (best-effort + all-or-nothing, not peeks).
    pub bytes_read: u64,
    /// Number of producer calls that observed `write_avail == 0`.
    pub full_encounters: u64,
    /// Number of consumer calls that observed `read_avail == 0`.
    pub empty_encounters: u64,
}

/// Optional atomic counters for monitoring queue activity.
///
/// Only touched when `FifoConfig::enable_metrics` is set, matching the
/// queue's contract that it otherwise never does bookkeeping beyond the two
/// published counters.
#[derive(Debug, Default)]
pub struct Metrics {
    bytes_written: AtomicU64,
    bytes_read: AtomicU64,
    full_encounters: AtomicU64,
    empty_encounters: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bytes_written(&self, n: u64) {
        self.bytes_written.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_bytes_read(&self, n: u64) {
        self.bytes_read.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_full(&self) {
        self.full_encounters.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty(&self) {
        self.empty_encounters.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            full_encounters: self.full_encounters.load(Ordering::Relaxed),
            empty_encounters: self.empty_encounters.load(Ordering::Relaxed),
        }
    }
}
