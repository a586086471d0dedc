//! Render-ready dashboard view.
//!
//! [`DashboardView`] bundles everything a front end needs for one frame:
//! the shared environment header, one row per app with consistency flags,
//! and the history list for the focused app. It is derived, never mutated,
//! and rebuilt on every state change.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use deploytrail_store::DeploymentRecord;
use serde::{Deserialize, Serialize};

use crate::consistency::{all_same, cell_flags, majority_version, ConsistencyRule};
use crate::matrix::{reduce, Reduction, RejectedRecord};

/// One environment cell in an app row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub version: String,
    pub consistent: bool,
    pub deployment: DeploymentRecord,
}

/// One app row of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRow {
    pub app: String,
    /// Keyed by environment; environments without a deployment are absent.
    pub cells: BTreeMap<String, CellView>,
    pub last_updated: Option<DateTime<Utc>>,
    pub majority_version: Option<String>,
    pub all_same: bool,
}

impl AppRow {
    pub fn cell(&self, environment: &str) -> Option<&CellView> {
        self.cells.get(environment)
    }
}

/// Drill-down for the focused app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    pub app: String,
    pub deployments: Vec<DeploymentRecord>,
}

/// Everything needed to draw the dashboard once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub rule: ConsistencyRule,
    pub environments: Vec<String>,
    pub rows: Vec<AppRow>,
    pub history: Option<HistoryView>,
    pub rejected: Vec<RejectedRecord>,
}

impl DashboardView {
    /// Build a view from a record set, the focused app and a rule.
    pub fn build(
        records: &[DeploymentRecord],
        selected_app: Option<&str>,
        rule: ConsistencyRule,
    ) -> Self {
        let reduction = reduce(records);
        let history = selected_app.map(|app| HistoryView {
            app: app.to_string(),
            deployments: history_for(records, app),
        });
        Self::from_reduction(reduction, history, rule)
    }

    fn from_reduction(
        reduction: Reduction,
        history: Option<HistoryView>,
        rule: ConsistencyRule,
    ) -> Self {
        let Reduction {
            matrix,
            last_updated,
            environments,
            rejected,
        } = reduction;

        let rows = matrix
            .into_iter()
            .map(|(app, row)| {
                let flags = cell_flags(&row, rule);
                let majority = majority_version(&row).map(str::to_string);
                let uniform = all_same(&row);
                let cells = row
                    .into_iter()
                    .map(|(env, record)| {
                        let consistent = flags.get(&env).copied().unwrap_or(false);
                        let cell = CellView {
                            version: record.version.clone(),
                            consistent,
                            deployment: record,
                        };
                        (env, cell)
                    })
                    .collect();
                AppRow {
                    last_updated: last_updated.get(&app).copied(),
                    app,
                    cells,
                    majority_version: majority,
                    all_same: uniform,
                }
            })
            .collect();

        DashboardView {
            rule,
            environments,
            rows,
            history,
            rejected,
        }
    }

    pub fn row(&self, app: &str) -> Option<&AppRow> {
        self.rows.iter().find(|r| r.app == app)
    }
}

/// All records of `app`, in the order they were received.
pub fn history_for(records: &[DeploymentRecord], app: &str) -> Vec<DeploymentRecord> {
    records.iter().filter(|r| r.app == app).cloned().collect()
}
