// src/error.rs

//! Unified error handling for the provisioner.

use std::fmt;

use thiserror::Error;

use crate::services::ControlPlaneError;

/// Result type alias for provisioner operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed provisioning request
    #[error("Validation error: {0}")]
    Validation(String),

    /// Control plane rejected or failed a call
    #[error("{operation} failed: {source}")]
    ControlPlane {
        operation: &'static str,
        #[source]
        source: ControlPlaneError,
    },

    /// Endpoint reached the terminal FAILED state
    #[error("Endpoint {arn} failed: {reason}")]
    EndpointFailed { arn: String, reason: String },

    /// Waiter gave up before the endpoint settled
    #[error("Timed out after {waited_secs}s waiting for {arn}")]
    Timeout { arn: String, waited_secs: u64 },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap a control plane error with the operation that produced it.
    pub fn control_plane(operation: &'static str, source: ControlPlaneError) -> Self {
        Self::ControlPlane { operation, source }
    }

    /// Create a terminal endpoint failure.
    pub fn endpoint_failed(arn: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::EndpointFailed {
            arn: arn.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_plane_error_display() {
        let err = AppError::control_plane(
            "CreateEndpoint",
            ControlPlaneError::Service("ResourceLimitExceededException".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "CreateEndpoint failed: ResourceLimitExceededException"
        );
    }
}
