//! Wire schema for deployment records
//!
//! Records are decoded exactly as the deployment API returns them. The
//! `deployed_at` field is kept as the raw string so that validation happens
//! in the reducer, where a bad timestamp rejects one record instead of the
//! whole batch.

use serde::{Deserialize, Serialize};

/// Opaque deployment identifier.
///
/// The API hands out integer keys, but string ids are accepted too. Numeric
/// ids order by value and sort before any text id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeploymentId {
    Numeric(u64),
    Text(String),
}

impl DeploymentId {
    /// Parse a user-supplied id, preferring the numeric form.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<u64>() {
            Ok(n) => DeploymentId::Numeric(n),
            Err(_) => DeploymentId::Text(raw.to_string()),
        }
    }
}

impl From<u64> for DeploymentId {
    fn from(n: u64) -> Self {
        DeploymentId::Numeric(n)
    }
}

impl From<&str> for DeploymentId {
    fn from(s: &str) -> Self {
        DeploymentId::parse(s)
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentId::Numeric(n) => write!(f, "{}", n),
            DeploymentId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One deployment event: `version` of `app` went to `environment` at
/// `deployed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: DeploymentId,
    pub app: String,
    pub environment: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// ISO-8601 timestamp as sent by the API
    pub deployed_at: String,
}

impl DeploymentRecord {
    pub fn new(
        id: impl Into<DeploymentId>,
        app: &str,
        environment: &str,
        version: &str,
        deployed_at: &str,
    ) -> Self {
        DeploymentRecord {
            id: id.into(),
            app: app.to_string(),
            environment: environment.to_string(),
            version: version.to_string(),
            note: None,
            deployed_at: deployed_at.to_string(),
        }
    }

    /// Attach a free-form note
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

/// Request body for recording a new deployment.
///
/// The API assigns `id` and stamps `deployed_at` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeployment {
    pub app: String,
    pub environment: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NewDeployment {
    pub fn new(app: &str, environment: &str, version: &str) -> Self {
        NewDeployment {
            app: app.to_string(),
            environment: environment.to_string(),
            version: version.to_string(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<&str>) -> Self {
        self.note = note.map(str::to_string);
        self
    }
}
