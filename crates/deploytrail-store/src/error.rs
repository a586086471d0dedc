//! Error types for deploytrail-store

use thiserror::Error;

/// Errors that can occur while talking to the deployment store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// Deployment does not exist in the store
    #[error("Deployment not found: {id}")]
    NotFound { id: String },

    /// Id cannot be used as a URL path segment
    #[error("Deployment id {0:?} cannot be addressed")]
    InvalidId(String),

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Configured base URL is unusable
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// Runtime configuration document is malformed
    #[error("Invalid runtime config: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}
