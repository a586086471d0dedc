//! Latest-deployment matrix.
//!
//! [`reduce`] folds a batch of deployment records into the grid the
//! dashboard renders: for every app and environment, the most recent
//! deployment. It is a pure single pass and is rerun from scratch on every
//! refresh.
//!
//! Ordering between two deployments of the same cell compares the parsed
//! instant first, then `id`, `version`, the raw `deployed_at` text and
//! `note`. Exact timestamp ties therefore go to the larger id (the later
//! insert on the API side). Records equal on every key are identical, so the
//! result does not depend on the order records arrive in.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use deploytrail_store::{DeploymentId, DeploymentRecord};
use serde::{Deserialize, Serialize};

use crate::timestamp::parse_deployed_at;

/// Environment name → latest deployment for one app.
pub type EnvironmentRow = BTreeMap<String, DeploymentRecord>;

/// App name → environment row.
pub type Matrix = BTreeMap<String, EnvironmentRow>;

/// A record the reducer refused, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub id: DeploymentId,
    pub app: String,
    pub environment: String,
    pub reason: String,
}

/// Output of one reduction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reduction {
    /// Latest deployment per app and environment. Missing pairs are absent.
    pub matrix: Matrix,
    /// Most recent `deployed_at` per app, across all environments.
    pub last_updated: BTreeMap<String, DateTime<Utc>>,
    /// Every environment seen, sorted and de-duplicated. Shared table header.
    pub environments: Vec<String>,
    /// Records dropped because their timestamp did not parse.
    pub rejected: Vec<RejectedRecord>,
}

impl Reduction {
    /// Project the matrix back to a flat record list.
    pub fn latest_records(&self) -> Vec<DeploymentRecord> {
        self.matrix
            .values()
            .flat_map(|row| row.values().cloned())
            .collect()
    }

    /// Row for one app, if it has any deployment.
    pub fn row(&self, app: &str) -> Option<&EnvironmentRow> {
        self.matrix.get(app)
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

// app and environment are equal within a cell, so these fields cover the
// whole record.
type SortKey<'a> = (
    DateTime<Utc>,
    &'a DeploymentId,
    &'a str,
    &'a str,
    Option<&'a str>,
);

fn sort_key(deployed_at: DateTime<Utc>, record: &DeploymentRecord) -> SortKey<'_> {
    (
        deployed_at,
        &record.id,
        record.version.as_str(),
        record.deployed_at.as_str(),
        record.note.as_deref(),
    )
}

struct Candidate<'a> {
    deployed_at: DateTime<Utc>,
    record: &'a DeploymentRecord,
}

impl Candidate<'_> {
    fn key(&self) -> SortKey<'_> {
        sort_key(self.deployed_at, self.record)
    }

    fn is_older_than(&self, deployed_at: DateTime<Utc>, record: &DeploymentRecord) -> bool {
        self.key() < sort_key(deployed_at, record)
    }
}

/// Reduce a batch of records into the latest-deployment matrix.
pub fn reduce(records: &[DeploymentRecord]) -> Reduction {
    let mut cells: BTreeMap<&str, BTreeMap<&str, Candidate<'_>>> = BTreeMap::new();
    let mut last_updated: BTreeMap<String, DateTime<Utc>> = BTreeMap::new();
    let mut environments: BTreeSet<&str> = BTreeSet::new();
    let mut rejected = Vec::new();

    for record in records {
        let deployed_at = match parse_deployed_at(&record.deployed_at) {
            Ok(ts) => ts,
            Err(err) => {
                rejected.push(RejectedRecord {
                    id: record.id.clone(),
                    app: record.app.clone(),
                    environment: record.environment.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        environments.insert(record.environment.as_str());

        last_updated
            .entry(record.app.clone())
            .and_modify(|latest| {
                if *latest < deployed_at {
                    *latest = deployed_at;
                }
            })
            .or_insert(deployed_at);

        let row = cells.entry(record.app.as_str()).or_default();
        let replace = match row.get(record.environment.as_str()) {
            Some(current) => current.is_older_than(deployed_at, record),
            None => true,
        };
        if replace {
            row.insert(
                record.environment.as_str(),
                Candidate {
                    deployed_at,
                    record,
                },
            );
        }
    }

    let matrix = cells
        .into_iter()
        .map(|(app, row)| {
            let row = row
                .into_iter()
                .map(|(env, candidate)| (env.to_string(), candidate.record.clone()))
                .collect();
            (app.to_string(), row)
        })
        .collect();

    Reduction {
        matrix,
        last_updated,
        environments: environments.into_iter().map(str::to_string).collect(),
        rejected,
    }
}
