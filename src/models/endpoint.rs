//! Endpoint state as observed on the control plane.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a managed inference endpoint.
///
/// Owned by the control plane. The provisioner reads it fresh on every poll
/// and never caches or mutates it. A missing endpoint is reported as a
/// not-found error by the control plane rather than as a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExternalResourceState {
    Creating,
    Updating,
    Deleting,
    InService,
    Failed,
}

impl ExternalResourceState {
    /// Wire name used by the control plane.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "CREATING",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::InService => "IN_SERVICE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ExternalResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status string the control plane returned that we do not model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized endpoint status '{0}'")]
pub struct UnknownStateError(pub String);

impl FromStr for ExternalResourceState {
    type Err = UnknownStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATING" => Ok(Self::Creating),
            "UPDATING" => Ok(Self::Updating),
            "DELETING" => Ok(Self::Deleting),
            "IN_SERVICE" => Ok(Self::InService),
            "FAILED" => Ok(Self::Failed),
            other => Err(UnknownStateError(other.to_string())),
        }
    }
}

/// Parameters for a create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    /// Unique endpoint name, never reused across attempts
    pub name: String,

    /// Classifier model served by the endpoint
    pub model_arn: String,

    /// Throughput sizing
    pub desired_inference_units: i32,
}

/// What the control plane hands back from a create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEndpoint {
    pub endpoint_arn: String,
    pub model_arn: Option<String>,
}

/// Result of a describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescription {
    pub arn: String,
    pub state: ExternalResourceState,

    /// Service-provided detail, usually the reason for a FAILED state
    pub message: Option<String>,
}
