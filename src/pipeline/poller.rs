// src/pipeline/poller.rs

//! Completion poller: classifies the endpoint's current state.

use std::sync::Arc;

use log::{error, info};

use crate::error::{AppError, Result};
use crate::models::{Completion, CompletionQuery, EndpointDescription, ExternalResourceState};
use crate::services::{ControlPlaneError, EndpointControlPlane};

/// Reads endpoint state fresh on every call and reports whether the last
/// lifecycle operation has settled.
#[derive(Clone)]
pub struct CompletionPoller {
    control_plane: Arc<dyn EndpointControlPlane>,
    fail_open_on_error: bool,
}

impl CompletionPoller {
    /// Describe failures other than "not found" are reported as `NotFound`
    /// when `fail_open_on_error` is set, and as errors otherwise.
    pub fn new(control_plane: Arc<dyn EndpointControlPlane>, fail_open_on_error: bool) -> Self {
        Self {
            control_plane,
            fail_open_on_error,
        }
    }

    pub async fn poll(&self, query: &CompletionQuery) -> Result<Completion> {
        let endpoint_arn = query.resource_identifier.as_str();

        match self.control_plane.describe_endpoint(endpoint_arn).await {
            Ok(description) => classify(description),
            Err(ControlPlaneError::NotFound(_)) => {
                info!("Endpoint {} not found", endpoint_arn);
                Ok(Completion::NotFound)
            }
            Err(e) if self.fail_open_on_error => {
                error!(
                    "DescribeEndpoint failed for {}: {}. Treating as complete.",
                    endpoint_arn, e
                );
                Ok(Completion::NotFound)
            }
            Err(e) => Err(AppError::control_plane("DescribeEndpoint", e)),
        }
    }
}

/// Map an observed state onto a completion.
///
/// `DELETING` counts as ready: teardown does not wait out the service's own
/// deletion latency. `FAILED` is terminal and surfaces as an error.
fn classify(description: EndpointDescription) -> Result<Completion> {
    info!("Endpoint {} is {}", description.arn, description.state);

    match description.state {
        ExternalResourceState::InService => Ok(Completion::Ready),
        ExternalResourceState::Creating | ExternalResourceState::Updating => {
            Ok(Completion::NotReady)
        }
        ExternalResourceState::Deleting => Ok(Completion::Ready),
        ExternalResourceState::Failed => Err(AppError::endpoint_failed(
            description.arn,
            description
                .message
                .unwrap_or_else(|| "no reason given".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn described(state: ExternalResourceState) -> EndpointDescription {
        EndpointDescription {
            arn: "arn:endpoint/1".to_string(),
            state,
            message: None,
        }
    }

    #[test]
    fn test_classify_states() {
        use ExternalResourceState::*;

        assert_eq!(classify(described(InService)).unwrap(), Completion::Ready);
        assert_eq!(classify(described(Creating)).unwrap(), Completion::NotReady);
        assert_eq!(classify(described(Updating)).unwrap(), Completion::NotReady);
        assert_eq!(classify(described(Deleting)).unwrap(), Completion::Ready);
    }

    #[test]
    fn test_classify_failed_is_terminal() {
        let mut description = described(ExternalResourceState::Failed);
        description.message = Some("model artifacts missing".to_string());

        match classify(description) {
            Err(AppError::EndpointFailed { arn, reason }) => {
                assert_eq!(arn, "arn:endpoint/1");
                assert_eq!(reason, "model artifacts missing");
            }
            other => panic!("expected EndpointFailed, got {other:?}"),
        }
    }
}
