//! HTTP client for the deployment API
//!
//! Talks to three endpoints under the configured base URL:
//!
//! - `GET    {API_URL}/deployments`       list all records
//! - `DELETE {API_URL}/deployments/{id}`  remove one record
//! - `POST   {API_URL}/deployments`       record a new deployment

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::error::StoreError;
use crate::schema::{DeploymentId, DeploymentRecord, NewDeployment};
use crate::storage_traits::{DeploymentStore, StoreResult};

const USER_AGENT: &str = concat!("deploytrail/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Deployment store backed by the REST API
pub struct HttpDeploymentStore {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpDeploymentStore {
    /// Create a client for the API named in `config`
    pub fn new(config: &RuntimeConfig) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let raw = config.api_url.trim_end_matches('/');
        let base_url =
            Url::parse(raw).map_err(|e| StoreError::InvalidBaseUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl(raw.to_string()));
        }

        Ok(HttpDeploymentStore {
            base_url,
            http_client,
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// URL of the deployment collection
    pub fn deployments_url(&self) -> String {
        self.url_with(&["deployments"])
    }

    /// URL of a single deployment. The id is one percent-encoded path segment.
    ///
    /// Empty, `.` and `..` ids would address the collection or its parent and
    /// are refused.
    pub fn deployment_url(&self, id: &DeploymentId) -> StoreResult<String> {
        let id = id.to_string();
        if matches!(id.as_str(), "" | "." | "..") {
            return Err(StoreError::InvalidId(id));
        }
        Ok(self.url_with(&["deployments", id.as_str()]))
    }

    fn url_with(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always has a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }
}

#[async_trait]
impl DeploymentStore for HttpDeploymentStore {
    async fn list(&self) -> StoreResult<Vec<DeploymentRecord>> {
        let url = self.deployments_url();
        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let values: Vec<serde_json::Value> = response.json().await?;
        let records = decode_listing(values);
        debug!(url = %url, count = records.len(), "fetched deployments");
        Ok(records)
    }

    async fn delete(&self, id: &DeploymentId) -> StoreResult<()> {
        let url = self.deployment_url(id)?;
        let response = self.http_client.delete(&url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound { id: id.to_string() }),
            status => Err(StoreError::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }

    async fn create(&self, deployment: &NewDeployment) -> StoreResult<DeploymentRecord> {
        let url = self.deployments_url();
        let response = self
            .http_client
            .post(&url)
            .json(deployment)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json().await?)
    }
}

/// Decode a listing element by element.
///
/// Elements that do not match the record schema are logged and skipped so a
/// single bad row cannot blank the dashboard.
pub fn decode_listing(values: Vec<serde_json::Value>) -> Vec<DeploymentRecord> {
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<DeploymentRecord>(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(
                    event = "listing.malformed_record",
                    index = index,
                    error = %err,
                    "skipping malformed deployment record"
                );
            }
        }
    }
    records
}
