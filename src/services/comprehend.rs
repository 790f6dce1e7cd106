//! Amazon Comprehend control plane.
//!
//! Thin adapter from `EndpointControlPlane` onto the Comprehend endpoint API
//! (`CreateEndpoint`, `UpdateEndpoint`, `DeleteEndpoint`, `DescribeEndpoint`).

use async_trait::async_trait;
use aws_sdk_comprehend::Client;
use aws_sdk_comprehend::error::DisplayErrorContext;
use aws_sdk_comprehend::operation::create_endpoint::CreateEndpointError;
use aws_sdk_comprehend::operation::delete_endpoint::DeleteEndpointError;
use aws_sdk_comprehend::operation::describe_endpoint::DescribeEndpointError;
use aws_sdk_comprehend::operation::update_endpoint::UpdateEndpointError;
use log::debug;

use crate::models::{CreatedEndpoint, EndpointDescription, EndpointSpec, ExternalResourceState};
use crate::services::{ControlPlaneError, EndpointControlPlane};

/// Comprehend-backed control plane.
#[derive(Clone)]
pub struct ComprehendControlPlane {
    client: Client,
}

impl ComprehendControlPlane {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a client from the ambient AWS configuration.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

/// Service errors that can say whether the addressed resource is missing.
trait ResourceNotFound: std::error::Error + 'static {
    fn is_not_found(&self) -> bool;
}

impl ResourceNotFound for CreateEndpointError {
    fn is_not_found(&self) -> bool {
        self.is_resource_not_found_exception()
    }
}

impl ResourceNotFound for UpdateEndpointError {
    fn is_not_found(&self) -> bool {
        self.is_resource_not_found_exception()
    }
}

impl ResourceNotFound for DeleteEndpointError {
    fn is_not_found(&self) -> bool {
        self.is_resource_not_found_exception()
    }
}

impl ResourceNotFound for DescribeEndpointError {
    fn is_not_found(&self) -> bool {
        self.is_resource_not_found_exception()
    }
}

/// Map an operation's service error onto `ControlPlaneError`.
///
/// `resource` names what was addressed: the endpoint ARN, or the model ARN on create.
fn map_service_error<E: ResourceNotFound>(err: E, resource: &str) -> ControlPlaneError {
    if err.is_not_found() {
        ControlPlaneError::NotFound(resource.to_string())
    } else {
        ControlPlaneError::Service(DisplayErrorContext(&err).to_string())
    }
}

#[async_trait]
impl EndpointControlPlane for ComprehendControlPlane {
    async fn create_endpoint(
        &self,
        spec: &EndpointSpec,
    ) -> Result<CreatedEndpoint, ControlPlaneError> {
        let output = self
            .client
            .create_endpoint()
            .endpoint_name(&spec.name)
            .model_arn(&spec.model_arn)
            .desired_inference_units(spec.desired_inference_units)
            .send()
            .await
            .map_err(|e| map_service_error(e.into_service_error(), &spec.model_arn))?;

        let endpoint_arn = output.endpoint_arn().ok_or_else(|| {
            ControlPlaneError::MalformedResponse("CreateEndpoint returned no EndpointArn".into())
        })?;
        debug!("CreateEndpoint {} -> {}", spec.name, endpoint_arn);

        Ok(CreatedEndpoint {
            endpoint_arn: endpoint_arn.to_string(),
            model_arn: output.model_arn().map(str::to_string),
        })
    }

    async fn update_endpoint(
        &self,
        endpoint_arn: &str,
        model_arn: &str,
        desired_inference_units: i32,
    ) -> Result<(), ControlPlaneError> {
        self.client
            .update_endpoint()
            .endpoint_arn(endpoint_arn)
            .desired_model_arn(model_arn)
            .desired_inference_units(desired_inference_units)
            .send()
            .await
            .map_err(|e| map_service_error(e.into_service_error(), endpoint_arn))?;
        Ok(())
    }

    async fn delete_endpoint(&self, endpoint_arn: &str) -> Result<(), ControlPlaneError> {
        self.client
            .delete_endpoint()
            .endpoint_arn(endpoint_arn)
            .send()
            .await
            .map_err(|e| map_service_error(e.into_service_error(), endpoint_arn))?;
        Ok(())
    }

    async fn describe_endpoint(
        &self,
        endpoint_arn: &str,
    ) -> Result<EndpointDescription, ControlPlaneError> {
        let output = self
            .client
            .describe_endpoint()
            .endpoint_arn(endpoint_arn)
            .send()
            .await
            .map_err(|e| map_service_error(e.into_service_error(), endpoint_arn))?;

        let properties = output.endpoint_properties().ok_or_else(|| {
            ControlPlaneError::MalformedResponse(format!(
                "DescribeEndpoint for {endpoint_arn} returned no EndpointProperties"
            ))
        })?;
        let status = properties.status().ok_or_else(|| {
            ControlPlaneError::MalformedResponse(format!(
                "DescribeEndpoint for {endpoint_arn} returned no Status"
            ))
        })?;
        let state: ExternalResourceState = status
            .as_str()
            .parse()
            .map_err(|e| ControlPlaneError::MalformedResponse(format!("{e}")))?;

        Ok(EndpointDescription {
            arn: endpoint_arn.to_string(),
            state,
            message: properties.message().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_comprehend::types::error::{ResourceNotFoundException, TooManyRequestsException};

    use super::*;

    #[test]
    fn test_resource_not_found_maps_to_not_found() {
        let err = DescribeEndpointError::ResourceNotFoundException(
            ResourceNotFoundException::builder()
                .message("endpoint does not exist")
                .build(),
        );
        assert_eq!(
            map_service_error(err, "arn:endpoint/gone"),
            ControlPlaneError::NotFound("arn:endpoint/gone".to_string())
        );
    }

    #[test]
    fn test_other_errors_map_to_service() {
        let err = DeleteEndpointError::TooManyRequestsException(
            TooManyRequestsException::builder()
                .message("slow down")
                .build(),
        );
        match map_service_error(err, "arn:endpoint/busy") {
            ControlPlaneError::Service(message) => assert!(message.contains("slow down")),
            other => panic!("expected Service, got {other:?}"),
        }
    }
}
