//! Structured log events for the dashboard lifecycle.
//!
//! Each function emits one event with a stable `event = "..."` field so log
//! pipelines can filter on it:
//!
//! | event              | level |
//! |--------------------|-------|
//! | `poll.succeeded`   | debug |
//! | `poll.failed`      | warn  |
//! | `record.rejected`  | warn  |
//! | `delete.succeeded` | info  |
//! | `delete.failed`    | warn  |
//! | `poller.started`   | info  |
//! | `poller.stopped`   | info  |

use tracing::{debug, info, warn};

/// Span tagging every event of one poll cycle with its sequence number.
///
/// Attach it with `Instrument::instrument` rather than entering it, since
/// the cycle spans an `.await`.
pub fn poll_span(cycle: u64) -> tracing::Span {
    tracing::debug_span!("deploytrail.poll", cycle = cycle)
}

pub fn emit_poll_succeeded(records: usize, rejected: usize) {
    debug!(
        event = "poll.succeeded",
        records = records,
        rejected = rejected
    );
}

pub fn emit_poll_failed(error: &dyn std::fmt::Display) {
    warn!(event = "poll.failed", error = %error, "fetch failed, keeping last known deployments");
}

pub fn emit_record_rejected(id: &str, app: &str, reason: &str) {
    warn!(event = "record.rejected", id = %id, app = %app, reason = %reason);
}

pub fn emit_delete_succeeded(id: &str, removed: usize) {
    info!(event = "delete.succeeded", id = %id, removed_locally = removed);
}

pub fn emit_delete_failed(id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "delete.failed", id = %id, error = %error, "delete failed, state unchanged");
}

pub fn emit_poller_started(interval_ms: u64) {
    info!(event = "poller.started", interval_ms = interval_ms);
}

pub fn emit_poller_stopped(cycles: u64) {
    info!(event = "poller.stopped", cycles = cycles);
}
