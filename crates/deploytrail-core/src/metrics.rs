//! Global atomic counters for dashboard activity.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. when the watcher shuts down).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    polls_succeeded: AtomicU64,
    polls_failed: AtomicU64,
    records_rejected: AtomicU64,
    deletes_succeeded: AtomicU64,
    deletes_failed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            polls_succeeded: AtomicU64::new(0),
            polls_failed: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
            deletes_succeeded: AtomicU64::new(0),
            deletes_failed: AtomicU64::new(0),
        }
    }

    pub fn inc_polls_succeeded(&self) {
        self.polls_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "polls_succeeded", "counter incremented");
    }

    pub fn inc_polls_failed(&self) {
        self.polls_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "polls_failed", "counter incremented");
    }

    /// Add `n` rejected records from one reduction.
    pub fn add_records_rejected(&self, n: u64) {
        if n == 0 {
            return;
        }
        self.records_rejected.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "records_rejected", by = n, "counter incremented");
    }

    pub fn inc_deletes_succeeded(&self) {
        self.deletes_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "deletes_succeeded", "counter incremented");
    }

    pub fn inc_deletes_failed(&self) {
        self.deletes_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "deletes_failed", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            polls_succeeded = self.polls_succeeded(),
            polls_failed = self.polls_failed(),
            records_rejected = self.records_rejected(),
            deletes_succeeded = self.deletes_succeeded(),
            deletes_failed = self.deletes_failed(),
        );
    }

    pub fn polls_succeeded(&self) -> u64 {
        self.polls_succeeded.load(Ordering::Relaxed)
    }

    pub fn polls_failed(&self) -> u64 {
        self.polls_failed.load(Ordering::Relaxed)
    }

    pub fn records_rejected(&self) -> u64 {
        self.records_rejected.load(Ordering::Relaxed)
    }

    pub fn deletes_succeeded(&self) -> u64 {
        self.deletes_succeeded.load(Ordering::Relaxed)
    }

    pub fn deletes_failed(&self) -> u64 {
        self.deletes_failed.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.polls_succeeded.store(0, Ordering::Relaxed);
        self.polls_failed.store(0, Ordering::Relaxed);
        self.records_rejected.store(0, Ordering::Relaxed);
        self.deletes_succeeded.store(0, Ordering::Relaxed);
        self.deletes_failed.store(0, Ordering::Relaxed);
    }
}
