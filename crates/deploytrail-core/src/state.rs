//! Client-side dashboard state.
//!
//! `DashboardState` is the single source of truth: the last record batch
//! received from the store and the focused app. Everything shown on screen
//! is derived from it through [`DashboardState::view`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use deploytrail_store::{DeploymentId, DeploymentRecord};

use crate::consistency::ConsistencyRule;
use crate::view::{history_for, DashboardView};

/// State shared between the poller and the front end.
///
/// The lock is never held across an `.await`.
pub type SharedState = Arc<Mutex<DashboardState>>;

/// Lock shared state, ignoring poisoning.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, DashboardState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    records: Vec<DeploymentRecord>,
    selected_app: Option<String>,
    generation: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh state for sharing.
    pub fn shared() -> SharedState {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn records(&self) -> &[DeploymentRecord] {
        &self.records
    }

    pub fn selected_app(&self) -> Option<&str> {
        self.selected_app.as_deref()
    }

    /// Number of times the record set has been replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the record set with a newly received batch.
    ///
    /// Last received wins: a slow response that lands after a newer one
    /// overwrites it. There is no sequencing.
    pub fn replace_records(&mut self, records: Vec<DeploymentRecord>) {
        self.records = records;
        self.generation += 1;
    }

    /// Drop the record with `id`, returning how many records were removed.
    ///
    /// Ids are unique in the store, so this removes one record or none.
    pub fn remove(&mut self, id: &DeploymentId) -> usize {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        before - self.records.len()
    }

    /// Focus `app`, or clear the focus if it is already focused.
    pub fn toggle_app(&mut self, app: &str) {
        if self.selected_app.as_deref() == Some(app) {
            self.selected_app = None;
        } else {
            self.selected_app = Some(app.to_string());
        }
    }

    pub fn select_app(&mut self, app: Option<&str>) {
        self.selected_app = app.map(str::to_string);
    }

    /// Records of the focused app, empty when nothing is focused.
    pub fn history(&self) -> Vec<DeploymentRecord> {
        match self.selected_app.as_deref() {
            Some(app) => history_for(&self.records, app),
            None => Vec::new(),
        }
    }

    /// Derive the dashboard view under `rule`.
    pub fn view(&self, rule: ConsistencyRule) -> DashboardView {
        DashboardView::build(&self.records, self.selected_app(), rule)
    }
}
