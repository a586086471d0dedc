//! Runtime configuration
//!
//! The dashboard is pointed at its API by a small JSON document:
//!
//! ```json
//! { "API_URL": "https://deploys.example.com", "VERSION": "1.4.0" }
//! ```
//!
//! A missing or broken document is never fatal: callers use
//! [`RuntimeConfig::load_or_default`] and continue with the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::storage_traits::StoreResult;

/// API location used when no config document is available
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Build label shown when the document carries no `VERSION`
pub const DEFAULT_VERSION: &str = "dev";

/// Runtime configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Base URL of the deployment API
    #[serde(rename = "API_URL")]
    pub api_url: String,
    /// Build/version label for display
    #[serde(rename = "VERSION", default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            api_url: DEFAULT_API_URL.to_string(),
            version: default_version(),
        }
    }
}

impl RuntimeConfig {
    /// Create a config for a specific API
    pub fn new(api_url: &str) -> Self {
        RuntimeConfig {
            api_url: api_url.to_string(),
            version: default_version(),
        }
    }

    /// Parse a config document from JSON text
    pub fn from_json(text: &str) -> StoreResult<Self> {
        let config: RuntimeConfig =
            serde_json::from_str(text).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validated()
    }

    /// Read and parse a config document
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Read a config document, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                debug!(path = %path.display(), api_url = %config.api_url, "loaded runtime config");
                config
            }
            Err(err) => {
                warn!(
                    event = "config.fallback",
                    path = %path.display(),
                    error = %err,
                    "failed to load runtime config, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Replace the API URL (command-line or environment override)
    pub fn with_api_url(mut self, api_url: &str) -> StoreResult<Self> {
        self.api_url = api_url.to_string();
        self.validated()
    }

    fn validated(mut self) -> StoreResult<Self> {
        let trimmed = self.api_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(StoreError::InvalidBaseUrl(self.api_url));
        }
        self.api_url = trimmed.to_string();
        if self.version.trim().is_empty() {
            self.version = default_version();
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_from_json() {
        let config =
            RuntimeConfig::from_json(r#"{"API_URL":"https://api.example.com/","VERSION":"1.2.0"}"#)
                .unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.version, "1.2.0");
    }

    #[test]
    fn test_config_version_defaults_to_dev() {
        let config = RuntimeConfig::from_json(r#"{"API_URL":"http://localhost:9000"}"#).unwrap();
        assert_eq!(config.version, "dev");

        let config =
            RuntimeConfig::from_json(r#"{"API_URL":"http://localhost:9000","VERSION":""}"#)
                .unwrap();
        assert_eq!(config.version, "dev");
    }

    #[test]
    fn test_config_missing_api_url_is_error() {
        let err = RuntimeConfig::from_json(r#"{"VERSION":"1.0"}"#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_config_rejects_non_http_url() {
        let err = RuntimeConfig::from_json(r#"{"API_URL":"ftp://nope"}"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"API_URL":"http://deploys.internal:8000"}"#).unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config.api_url, "http://deploys.internal:8000");
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempdir().unwrap();
        let config = RuntimeConfig::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_load_or_default_on_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json at all").unwrap();

        let config = RuntimeConfig::load_or_default(&path);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.version, DEFAULT_VERSION);
    }

    #[test]
    fn test_with_api_url_override() {
        let config = RuntimeConfig::default()
            .with_api_url("https://override.example.com//")
            .unwrap();
        assert_eq!(config.api_url, "https://override.example.com");
        assert!(RuntimeConfig::default().with_api_url("localhost").is_err());
    }
}
