// src/lambda/mod.rs

//! AWS Lambda handlers for the custom-resource provider.
//!
//! One `Provisioner` is built per cold start and reused by every invocation:
//! 1. `on_event` runs the lifecycle handler (create/update/delete)
//! 2. `is_complete` runs the completion poller
//!
//! Errors are returned to the runtime so the provider framework marks the
//! resource as failed.

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::ProvisionerConfig;
use crate::pipeline::{CompletionPoller, LifecycleHandler};
use crate::provider::{self, IsCompleteResponse, OnEventResponse, ProviderEvent};
use crate::services::{ComprehendControlPlane, EndpointControlPlane};

/// Handler and poller sharing one control plane client.
#[derive(Clone)]
pub struct Provisioner {
    handler: LifecycleHandler,
    poller: CompletionPoller,
}

impl Provisioner {
    /// Wire the handler and poller to `control_plane`.
    pub fn new(control_plane: Arc<dyn EndpointControlPlane>, config: &ProvisionerConfig) -> Self {
        Self {
            handler: LifecycleHandler::new(control_plane.clone(), config.endpoint.clone()),
            poller: CompletionPoller::new(control_plane, config.poller.fail_open_on_error),
        }
    }

    /// Build from environment configuration and the ambient AWS credentials.
    pub async fn from_env() -> Result<Self> {
        let config = ProvisionerConfig::from_env()?;
        config.validate()?;
        info!(
            "Provisioner config: prefix={}, units={}, fail_open={}",
            config.endpoint.name_prefix,
            config.endpoint.desired_inference_units,
            config.poller.fail_open_on_error
        );

        let control_plane = ComprehendControlPlane::from_env().await;
        Ok(Self::new(Arc::new(control_plane), &config))
    }

    /// `onEvent` entry point.
    #[instrument(skip(self, event), fields(request_id = %event.context.request_id))]
    pub async fn on_event(
        &self,
        event: LambdaEvent<ProviderEvent>,
    ) -> std::result::Result<OnEventResponse, LambdaError> {
        let (payload, _context) = event.into_parts();
        info!(
            "onEvent {} for {:?}",
            payload.request_type, payload.physical_resource_id
        );

        match provider::on_event(&self.handler, &payload).await {
            Ok(response) => {
                info!("onEvent succeeded: {}", response.physical_resource_id);
                Ok(response)
            }
            Err(e) => {
                error!("onEvent failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// `isComplete` entry point.
    #[instrument(skip(self, event), fields(request_id = %event.context.request_id))]
    pub async fn is_complete(
        &self,
        event: LambdaEvent<ProviderEvent>,
    ) -> std::result::Result<IsCompleteResponse, LambdaError> {
        let (payload, _context) = event.into_parts();

        match provider::is_complete(&self.poller, &payload).await {
            Ok(response) => {
                info!(
                    "isComplete {:?}: {}",
                    payload.physical_resource_id, response.is_complete
                );
                Ok(response)
            }
            Err(e) => {
                error!("isComplete failed: {}", e);
                Err(e.into())
            }
        }
    }
}
