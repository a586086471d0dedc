//! Periodic refresh of the dashboard state.
//!
//! [`Poller::spawn`] starts a tokio task that refreshes once immediately and
//! then on every interval tick. Successful refreshes replace the shared
//! state and publish the new state generation on a `watch` channel; failed
//! ones are logged and the last known records stay in place until the next
//! tick. There is no retry or backoff.
//!
//! Stopping only prevents future fetches. A fetch already in flight runs to
//! completion and its result is applied before the task exits.

use std::sync::Arc;
use std::time::Duration;

use deploytrail_store::DeploymentStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{warn, Instrument};

use crate::actions::refresh;
use crate::obs::{emit_poller_started, emit_poller_stopped, poll_span};
use crate::state::SharedState;

/// Refresh cadence of the dashboard.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Configured, not yet running, poller.
pub struct Poller {
    store: Arc<dyn DeploymentStore>,
    state: SharedState,
    interval: Duration,
}

impl Poller {
    pub fn new(store: Arc<dyn DeploymentStore>, state: SharedState) -> Self {
        Poller {
            store,
            state,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the refresh interval. Zero is clamped to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling on the current tokio runtime.
    ///
    /// Dropping the returned handle stops polling after the current cycle.
    pub fn spawn(self) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (refresh_tx, refresh_rx) = watch::channel(0u64);

        emit_poller_started(self.interval.as_millis() as u64);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut cycles = 0u64;

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                cycles += 1;
                let result = refresh(self.store.as_ref(), &self.state)
                    .instrument(poll_span(cycles))
                    .await;
                if let Ok(outcome) = result {
                    refresh_tx.send_replace(outcome.generation);
                }
            }

            emit_poller_stopped(cycles);
            cycles
        });

        PollerHandle {
            stop_tx,
            refresh_rx,
            task,
        }
    }
}

/// Handle to a running poller.
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    refresh_rx: watch::Receiver<u64>,
    task: JoinHandle<u64>,
}

impl PollerHandle {
    /// Receiver that changes after every successful refresh.
    ///
    /// The value is the state generation the refresh produced.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.refresh_rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop polling and wait for the task to exit.
    ///
    /// Returns the number of poll cycles that ran.
    pub async fn stop(self) -> u64 {
        self.stop_tx.send_replace(true);
        match self.task.await {
            Ok(cycles) => cycles,
            Err(err) => {
                warn!(event = "poller.join_failed", error = %err);
                0
            }
        }
    }
}
