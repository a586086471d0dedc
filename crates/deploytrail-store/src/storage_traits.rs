//! Storage trait for the remote deployment store
//!
//! `DeploymentStore` is the seam between the dashboard and the deployment
//! API. The HTTP implementation lives in [`crate::http`]; an in-memory fake
//! for tests lives in [`crate::fakes`].

use async_trait::async_trait;

use crate::error::StoreError;
use crate::schema::{DeploymentId, DeploymentRecord, NewDeployment};

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Remote deployment store.
///
/// Guarantees:
/// - `list` returns every record the store currently holds, in the store's
///   own order (the API sorts newest first, callers must not rely on it).
/// - `delete` of an unknown id fails with `StoreError::NotFound`.
/// - `create` returns the record as stored, with `id` and `deployed_at` set.
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Fetch all deployment records.
    async fn list(&self) -> StoreResult<Vec<DeploymentRecord>>;

    /// Delete one deployment by id.
    async fn delete(&self, id: &DeploymentId) -> StoreResult<()>;

    /// Record a new deployment.
    async fn create(&self, deployment: &NewDeployment) -> StoreResult<DeploymentRecord>;
}
