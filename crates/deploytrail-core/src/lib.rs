//! DeployTrail Core Library
//!
//! Domain logic of the deployment dashboard: the latest-deployment matrix,
//! version consistency flags, client state, the poller and the delete /
//! record actions. Transport lives in `deploytrail-store`.

pub mod actions;
pub mod consistency;
pub mod error;
pub mod matrix;
pub mod metrics;
pub mod obs;
pub mod poller;
pub mod state;
pub mod telemetry;
pub mod timestamp;
pub mod view;

pub use actions::{delete_deployment, record_deployment, refresh, RefreshOutcome};
pub use consistency::{all_same, cell_flags, majority_version, ConsistencyRule};
pub use error::{CoreError, Result};
pub use matrix::{reduce, EnvironmentRow, Matrix, Reduction, RejectedRecord};
pub use poller::{Poller, PollerHandle, DEFAULT_POLL_INTERVAL};
pub use state::{lock_state, DashboardState, SharedState};
pub use timestamp::parse_deployed_at;
pub use view::{history_for, AppRow, CellView, DashboardView, HistoryView};

pub use deploytrail_store::{
    DeploymentId, DeploymentRecord, DeploymentStore, HttpDeploymentStore, NewDeployment,
    RuntimeConfig, StoreError,
};

pub use metrics::METRICS;
pub use obs::{
    emit_delete_failed, emit_delete_succeeded, emit_poll_failed, emit_poll_succeeded,
    emit_poller_started, emit_poller_stopped, emit_record_rejected, poll_span,
};
pub use telemetry::init_tracing;

/// DeployTrail version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
