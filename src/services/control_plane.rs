//! Control plane abstraction for managed inference endpoints.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CreatedEndpoint, EndpointDescription, EndpointSpec};

/// Error returned by a control plane call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlPlaneError {
    /// The endpoint does not exist (or no longer exists)
    #[error("endpoint not found: {0}")]
    NotFound(String),

    /// The service rejected or failed the call
    #[error("{0}")]
    Service(String),

    /// The service answered with something we cannot interpret
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Administrative operations on managed inference endpoints.
///
/// Every call is a one-shot mutation or read against the service; nothing is
/// cached. Implementations must be shareable across invocations, since one
/// instance is created per process and injected into the handler and poller.
#[async_trait]
pub trait EndpointControlPlane: Send + Sync {
    /// Submit creation. Returns as soon as the service assigns an ARN; the
    /// endpoint itself is still `CREATING`.
    async fn create_endpoint(
        &self,
        spec: &EndpointSpec,
    ) -> Result<CreatedEndpoint, ControlPlaneError>;

    /// Point an existing endpoint at a new model.
    async fn update_endpoint(
        &self,
        endpoint_arn: &str,
        model_arn: &str,
        desired_inference_units: i32,
    ) -> Result<(), ControlPlaneError>;

    /// Submit deletion.
    async fn delete_endpoint(&self, endpoint_arn: &str) -> Result<(), ControlPlaneError>;

    /// Read the current state.
    async fn describe_endpoint(
        &self,
        endpoint_arn: &str,
    ) -> Result<EndpointDescription, ControlPlaneError>;
}
