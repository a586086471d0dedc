//! In-memory fake for the deployment store (testing only)
//!
//! `MemoryDeploymentStore` satisfies the `DeploymentStore` contract without
//! a network. Failure injection and call counters let tests drive the
//! poller and the delete path through their error branches.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::schema::{DeploymentId, DeploymentRecord, NewDeployment};
use crate::storage_traits::{DeploymentStore, StoreResult};

/// Timestamp stamped on records created through the fake
pub const FAKE_CREATED_AT: &str = "2024-06-01T12:00:00Z";

/// In-memory deployment store backed by a `Vec<DeploymentRecord>`.
#[derive(Debug, Default)]
pub struct MemoryDeploymentStore {
    records: Mutex<Vec<DeploymentRecord>>,
    fail_list: AtomicBool,
    fail_delete: AtomicBool,
    list_calls: AtomicU64,
    next_id: AtomicU64,
}

impl MemoryDeploymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with records
    pub fn with_records(records: Vec<DeploymentRecord>) -> Self {
        let store = Self::default();
        store.replace(records);
        store
    }

    /// Replace the stored records wholesale
    pub fn replace(&self, records: Vec<DeploymentRecord>) {
        let max_numeric = records
            .iter()
            .filter_map(|r| match r.id {
                DeploymentId::Numeric(n) => Some(n),
                DeploymentId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        self.next_id.fetch_max(max_numeric, Ordering::SeqCst);
        *self.records.lock().unwrap() = records;
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<DeploymentRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Make subsequent `list` calls fail (or succeed again)
    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `delete` calls fail (or succeed again)
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Number of `list` calls seen so far, failed ones included
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentStore for MemoryDeploymentStore {
    async fn list(&self) -> StoreResult<Vec<DeploymentRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Http("injected list failure".to_string()));
        }
        Ok(self.records())
    }

    async fn delete(&self, id: &DeploymentId) -> StoreResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Http("injected delete failure".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let position = records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        records.remove(position);
        Ok(())
    }

    async fn create(&self, deployment: &NewDeployment) -> StoreResult<DeploymentRecord> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = DeploymentRecord {
            id: DeploymentId::Numeric(id),
            app: deployment.app.clone(),
            environment: deployment.environment.clone(),
            version: deployment.version.clone(),
            note: deployment.note.clone(),
            deployed_at: FAKE_CREATED_AT.to_string(),
        };
        // The API lists newest first.
        self.records.lock().unwrap().insert(0, record.clone());
        Ok(record)
    }
}
