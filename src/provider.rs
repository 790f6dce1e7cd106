// src/provider.rs

//! CloudFormation custom-resource provider framework payloads.
//!
//! The framework invokes an `onEvent` function once per desired-state change
//! and then an `isComplete` function on a fixed interval until it answers
//! `IsComplete: true`, fails, or the framework's total timeout elapses.
//! Field names follow the framework's PascalCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{CompletionQuery, CompletionStatus, Operation, ProvisioningRequest};
use crate::pipeline::{CompletionPoller, LifecycleHandler};

/// Framework bookkeeping that leaks into `ResourceProperties`.
const SERVICE_TOKEN: &str = "ServiceToken";

/// Event delivered to both `onEvent` and `isComplete`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProviderEvent {
    pub request_type: Operation,

    /// Absent on create; on `isComplete` this is the id `onEvent` returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,

    #[serde(default)]
    pub resource_properties: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_resource_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// `Data` returned by `onEvent`, echoed back to `isComplete`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl ProviderEvent {
    /// The lifecycle request this event describes.
    pub fn to_request(&self) -> ProvisioningRequest {
        let mut properties = self.resource_properties.clone();
        properties.remove(SERVICE_TOKEN);

        ProvisioningRequest {
            operation: self.request_type,
            resource_identifier: self.physical_resource_id.clone(),
            properties,
        }
    }

    /// The completion query for `isComplete`.
    pub fn to_query(&self) -> Result<CompletionQuery> {
        match self.physical_resource_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(CompletionQuery::new(id)),
            _ => Err(AppError::validation(
                "isComplete event is missing PhysicalResourceId",
            )),
        }
    }
}

/// `onEvent` answer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct OnEventResponse {
    pub physical_resource_id: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

/// `isComplete` answer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IsCompleteResponse {
    pub is_complete: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

/// Run the lifecycle handler for a framework event.
pub async fn on_event(
    handler: &LifecycleHandler,
    event: &ProviderEvent,
) -> Result<OnEventResponse> {
    let result = handler.handle(&event.to_request()).await?;
    Ok(OnEventResponse {
        physical_resource_id: result.resource_identifier,
        data: result.data,
    })
}

/// Run the completion poller for a framework event.
///
/// A vanished endpoint is reported complete so teardown never wedges.
pub async fn is_complete(
    poller: &CompletionPoller,
    event: &ProviderEvent,
) -> Result<IsCompleteResponse> {
    let completion = poller.poll(&event.to_query()?).await?;
    let status = CompletionStatus::from(completion);
    Ok(IsCompleteResponse {
        is_complete: status.is_complete,
        data: None,
    })
}
