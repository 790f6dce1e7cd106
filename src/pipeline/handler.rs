// src/pipeline/handler.rs

//! Lifecycle handler: turns a provisioning request into one control plane call.

use std::sync::Arc;

use log::{info, warn};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{
    EndpointConfig, EndpointSpec, Operation, ProvisioningRequest, ProvisioningResult,
};
use crate::services::{ControlPlaneError, EndpointControlPlane};
use crate::utils::generate_endpoint_name;

/// Issues create, update and delete calls for endpoint custom resources.
///
/// Holds no state between invocations beyond the injected control plane.
#[derive(Clone)]
pub struct LifecycleHandler {
    control_plane: Arc<dyn EndpointControlPlane>,
    config: EndpointConfig,
}

impl LifecycleHandler {
    pub fn new(control_plane: Arc<dyn EndpointControlPlane>, config: EndpointConfig) -> Self {
        Self {
            control_plane,
            config,
        }
    }

    /// Dispatch on the requested operation.
    pub async fn handle(&self, request: &ProvisioningRequest) -> Result<ProvisioningResult> {
        match request.operation {
            Operation::Create => self.on_create(request).await,
            Operation::Update => self.on_update(request).await,
            Operation::Delete => self.on_delete(request).await,
        }
    }

    /// Submit creation under a fresh name. Never retried.
    async fn on_create(&self, request: &ProvisioningRequest) -> Result<ProvisioningResult> {
        let model_arn = request.model_arn()?;
        let spec = EndpointSpec {
            name: generate_endpoint_name(&self.config.name_prefix),
            model_arn: model_arn.to_string(),
            desired_inference_units: self.config.desired_inference_units,
        };
        info!(
            "Creating endpoint {} for model {} ({} inference units)",
            spec.name, spec.model_arn, spec.desired_inference_units
        );

        let created = self
            .control_plane
            .create_endpoint(&spec)
            .await
            .map_err(|e| AppError::control_plane("CreateEndpoint", e))?;
        info!("Endpoint ARN: {}", created.endpoint_arn);

        let mut data = Map::new();
        data.insert("EndpointArn".into(), Value::from(created.endpoint_arn.clone()));
        data.insert("EndpointName".into(), Value::from(spec.name));
        data.insert(
            "ModelArn".into(),
            Value::from(created.model_arn.unwrap_or(spec.model_arn)),
        );
        data.insert(
            "DesiredInferenceUnits".into(),
            Value::from(spec.desired_inference_units),
        );

        Ok(ProvisioningResult {
            resource_identifier: created.endpoint_arn,
            data,
        })
    }

    /// Point the existing endpoint at the new model. The identifier is unchanged.
    async fn on_update(&self, request: &ProvisioningRequest) -> Result<ProvisioningResult> {
        let endpoint_arn = request.require_identifier()?;
        let model_arn = request.model_arn()?;
        info!("Updating endpoint {} to model {}", endpoint_arn, model_arn);

        self.control_plane
            .update_endpoint(endpoint_arn, model_arn, self.config.desired_inference_units)
            .await
            .map_err(|e| AppError::control_plane("UpdateEndpoint", e))?;

        Ok(unchanged(endpoint_arn))
    }

    /// Submit deletion. An endpoint that is already gone counts as deleted.
    async fn on_delete(&self, request: &ProvisioningRequest) -> Result<ProvisioningResult> {
        let endpoint_arn = request.require_identifier()?;
        info!("Deleting endpoint {}", endpoint_arn);

        match self.control_plane.delete_endpoint(endpoint_arn).await {
            Ok(()) => {}
            Err(ControlPlaneError::NotFound(_)) => {
                warn!("Endpoint {} already deleted", endpoint_arn);
            }
            Err(e) => return Err(AppError::control_plane("DeleteEndpoint", e)),
        }

        Ok(unchanged(endpoint_arn))
    }
}

fn unchanged(endpoint_arn: &str) -> ProvisioningResult {
    let mut data = Map::new();
    data.insert("EndpointArn".into(), Value::from(endpoint_arn));
    ProvisioningResult {
        resource_identifier: endpoint_arn.to_string(),
        data,
    }
}
