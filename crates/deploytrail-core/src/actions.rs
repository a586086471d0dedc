//! Side-effecting dashboard actions: refresh, delete, record.
//!
//! Failures are logged and returned, never retried. A failed refresh or
//! delete leaves the shared state exactly as it was.

use deploytrail_store::{DeploymentId, DeploymentRecord, DeploymentStore, NewDeployment};

use crate::error::Result;
use crate::matrix::{reduce, RejectedRecord};
use crate::metrics::METRICS;
use crate::obs::{
    emit_delete_failed, emit_delete_succeeded, emit_poll_failed, emit_poll_succeeded,
    emit_record_rejected,
};
use crate::state::{lock_state, SharedState};

/// Result of one successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Records now held in state.
    pub records: usize,
    /// Records the reducer will ignore because their timestamp is invalid.
    pub rejected: Vec<RejectedRecord>,
    /// State generation after the replace.
    pub generation: u64,
}

/// Fetch the full record list and replace the shared state with it.
pub async fn refresh(store: &dyn DeploymentStore, state: &SharedState) -> Result<RefreshOutcome> {
    let records = match store.list().await {
        Ok(records) => records,
        Err(err) => {
            METRICS.inc_polls_failed();
            emit_poll_failed(&err);
            return Err(err.into());
        }
    };

    let rejected = reduce(&records).rejected;
    for r in &rejected {
        emit_record_rejected(&r.id.to_string(), &r.app, &r.reason);
    }
    METRICS.add_records_rejected(rejected.len() as u64);
    METRICS.inc_polls_succeeded();
    emit_poll_succeeded(records.len(), rejected.len());

    let count = records.len();
    let generation = {
        let mut guard = lock_state(state);
        guard.replace_records(records);
        guard.generation()
    };

    Ok(RefreshOutcome {
        records: count,
        rejected,
        generation,
    })
}

/// Delete a deployment in the store, then drop it from local state.
///
/// Returns the number of local records removed (0 when the id was not held
/// locally). On failure the local state is untouched.
pub async fn delete_deployment(
    store: &dyn DeploymentStore,
    state: &SharedState,
    id: &DeploymentId,
) -> Result<usize> {
    if let Err(err) = store.delete(id).await {
        METRICS.inc_deletes_failed();
        emit_delete_failed(&id.to_string(), &err);
        return Err(err.into());
    }

    let removed = lock_state(state).remove(id);
    METRICS.inc_deletes_succeeded();
    emit_delete_succeeded(&id.to_string(), removed);
    Ok(removed)
}

/// Record a new deployment in the store.
pub async fn record_deployment(
    store: &dyn DeploymentStore,
    deployment: &NewDeployment,
) -> Result<DeploymentRecord> {
    let created = store.create(deployment).await?;
    tracing::info!(
        event = "deployment.recorded",
        id = %created.id,
        app = %created.app,
        environment = %created.environment,
        version = %created.version,
    );
    Ok(created)
}
