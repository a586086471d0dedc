//! Domain-level error taxonomy for DeployTrail.

use deploytrail_store::StoreError;

/// DeployTrail domain errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid deployed_at timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for DeployTrail domain operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_timestamp_display() {
        let err = CoreError::InvalidTimestamp {
            value: "yesterday".to_string(),
            reason: "input contains invalid characters".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid deployed_at timestamp"));
        assert!(msg.contains("\"yesterday\""));
    }

    #[test]
    fn test_store_error_converts() {
        let err: CoreError = StoreError::NotFound {
            id: "7".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Store(_)));
        assert!(err.to_string().contains("Deployment not found: 7"));
    }
}
