//! Poller lifecycle tests.
//!
//! All tests run on a paused tokio clock, so interval ticks fire as soon as
//! every task is idle and no test waits on real time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deploytrail_core::{lock_state, DashboardState, Poller};
use deploytrail_store::fakes::MemoryDeploymentStore;
use deploytrail_store::{
    DeploymentId, DeploymentRecord, DeploymentStore, NewDeployment, StoreResult,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seed() -> Vec<DeploymentRecord> {
    vec![
        DeploymentRecord::new(3u64, "web", "prod", "1.3", "2024-01-02T00:00:00Z"),
        DeploymentRecord::new(2u64, "web", "staging", "1.3", "2024-01-01T12:00:00Z"),
        DeploymentRecord::new(1u64, "web", "prod", "1.2", "2024-01-01T00:00:00Z"),
    ]
}

/// Store whose `list` takes `delay` of (virtual) time.
struct SlowStore {
    inner: MemoryDeploymentStore,
    delay: Duration,
}

#[async_trait]
impl DeploymentStore for SlowStore {
    async fn list(&self) -> StoreResult<Vec<DeploymentRecord>> {
        tokio::time::sleep(self.delay).await;
        self.inner.list().await
    }

    async fn delete(&self, id: &DeploymentId) -> StoreResult<()> {
        self.inner.delete(id).await
    }

    async fn create(&self, deployment: &NewDeployment) -> StoreResult<DeploymentRecord> {
        self.inner.create(deployment).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn fetches_immediately_then_every_interval() {
    let store = Arc::new(MemoryDeploymentStore::with_records(seed()));
    let state = DashboardState::shared();
    let handle = Poller::new(store.clone(), state.clone())
        .with_interval(Duration::from_secs(10))
        .spawn();
    let mut refreshes = handle.subscribe();

    refreshes.changed().await.unwrap();
    assert_eq!(*refreshes.borrow_and_update(), 1);
    assert_eq!(store.list_calls(), 1);
    assert_eq!(lock_state(&state).records().len(), 3);

    store.replace(seed()[..1].to_vec());
    refreshes.changed().await.unwrap();
    assert_eq!(*refreshes.borrow_and_update(), 2);
    assert_eq!(store.list_calls(), 2);
    assert_eq!(lock_state(&state).records().len(), 1);

    assert_eq!(handle.stop().await, 2);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_last_known_state() {
    let store = Arc::new(MemoryDeploymentStore::with_records(seed()));
    let state = DashboardState::shared();
    let handle = Poller::new(store.clone(), state.clone())
        .with_interval(Duration::from_secs(10))
        .spawn();
    let mut refreshes = handle.subscribe();
    refreshes.changed().await.unwrap();

    store.set_fail_list(true);
    tokio::time::sleep(Duration::from_secs(25)).await;

    assert_eq!(store.list_calls(), 3);
    {
        let guard = lock_state(&state);
        assert_eq!(guard.records().len(), 3);
        assert_eq!(guard.generation(), 1);
    }

    // Next scheduled poll picks up again once the store recovers.
    store.set_fail_list(false);
    refreshes.changed().await.unwrap();
    assert_eq!(lock_state(&state).generation(), 2);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_prevents_future_fetches() {
    let store = Arc::new(MemoryDeploymentStore::with_records(seed()));
    let state = DashboardState::shared();
    let handle = Poller::new(store.clone(), state.clone())
        .with_interval(Duration::from_secs(10))
        .spawn();
    let mut refreshes = handle.subscribe();
    refreshes.changed().await.unwrap();

    assert_eq!(handle.stop().await, 1);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.list_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_lets_in_flight_fetch_finish() {
    let store = Arc::new(SlowStore {
        inner: MemoryDeploymentStore::with_records(seed()),
        delay: Duration::from_secs(5),
    });
    let state = DashboardState::shared();
    let handle = Poller::new(store.clone(), state.clone())
        .with_interval(Duration::from_secs(10))
        .spawn();

    // The first fetch is now sleeping inside `list`.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(lock_state(&state).generation(), 0);

    let cycles = handle.stop().await;
    assert_eq!(cycles, 1);
    assert_eq!(store.inner.list_calls(), 1);
    assert_eq!(lock_state(&state).records().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn late_response_overwrites_newer_state() {
    // A refresh is applied whenever it lands; there is no sequencing, so a
    // slow response replaces whatever was stored in the meantime.
    let store = Arc::new(SlowStore {
        inner: MemoryDeploymentStore::with_records(seed()),
        delay: Duration::from_secs(5),
    });
    let state = DashboardState::shared();
    let handle = Poller::new(store.clone(), state.clone())
        .with_interval(Duration::from_secs(10))
        .spawn();

    tokio::time::sleep(Duration::from_secs(1)).await;
    lock_state(&state).replace_records(Vec::new());

    let mut refreshes = handle.subscribe();
    refreshes.changed().await.unwrap();
    assert_eq!(lock_state(&state).records().len(), 3);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_stops_polling() {
    let store = Arc::new(MemoryDeploymentStore::with_records(seed()));
    let state = DashboardState::shared();
    let handle = Poller::new(store.clone(), state.clone())
        .with_interval(Duration::from_secs(10))
        .spawn();
    let mut refreshes = handle.subscribe();
    refreshes.changed().await.unwrap();

    drop(handle);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.list_calls(), 1);
}
