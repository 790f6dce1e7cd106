//! Requests and results exchanged with the orchestrator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// Property keys that may carry the classifier model ARN, in lookup order.
pub const MODEL_PROPERTY_KEYS: &[&str] = &["documentclassifierarn", "modelReference"];

/// Lifecycle operation requested by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::validation(format!("Invalid request type: {s}"))),
        }
    }
}

impl TryFrom<String> for Operation {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.as_str().to_string()
    }
}

/// A desired-state change for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    pub operation: Operation,

    /// Identifier assigned by a prior create; absent on create
    #[serde(default)]
    pub resource_identifier: Option<String>,

    /// Operation-specific parameters
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl ProvisioningRequest {
    /// Build a create request for the given model.
    pub fn create(model_arn: impl Into<String>) -> Self {
        Self {
            operation: Operation::Create,
            resource_identifier: None,
            properties: model_properties(model_arn),
        }
    }

    /// Build an update request pointing an existing endpoint at a new model.
    pub fn update(resource_identifier: impl Into<String>, model_arn: impl Into<String>) -> Self {
        Self {
            operation: Operation::Update,
            resource_identifier: Some(resource_identifier.into()),
            properties: model_properties(model_arn),
        }
    }

    /// Build a delete request.
    pub fn delete(resource_identifier: impl Into<String>) -> Self {
        Self {
            operation: Operation::Delete,
            resource_identifier: Some(resource_identifier.into()),
            properties: Map::new(),
        }
    }

    /// The identifier carried over from create, required for update and delete.
    pub fn require_identifier(&self) -> Result<&str> {
        match self.resource_identifier.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(AppError::validation(format!(
                "{} request is missing a resource identifier",
                self.operation
            ))),
        }
    }

    /// The classifier model ARN from the request properties.
    pub fn model_arn(&self) -> Result<&str> {
        for key in MODEL_PROPERTY_KEYS {
            match self.properties.get(*key) {
                Some(Value::String(arn)) if !arn.trim().is_empty() => return Ok(arn.as_str()),
                Some(Value::String(_)) | None => continue,
                Some(other) => {
                    return Err(AppError::validation(format!(
                        "property '{key}' must be a string, got {other}"
                    )));
                }
            }
        }
        Err(AppError::validation(format!(
            "{} request is missing the model property ({})",
            self.operation,
            MODEL_PROPERTY_KEYS.join(" or ")
        )))
    }
}

fn model_properties(model_arn: impl Into<String>) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        MODEL_PROPERTY_KEYS[0].to_string(),
        Value::String(model_arn.into()),
    );
    properties
}

/// Outcome of a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningResult {
    /// Stable identity of the endpoint, assigned once at create
    pub resource_identifier: String,

    /// Attributes exposed to dependents
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Request to check whether a lifecycle operation has settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionQuery {
    pub resource_identifier: String,
}

impl CompletionQuery {
    pub fn new(resource_identifier: impl Into<String>) -> Self {
        Self {
            resource_identifier: resource_identifier.into(),
        }
    }
}

/// Typed poll outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    /// Safe for dependents to proceed
    Ready,
    /// Still transitioning
    NotReady,
    /// The endpoint no longer exists, or could not be described
    NotFound,
}

impl Completion {
    /// Orchestrator policy: a missing endpoint does not block the pipeline.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Ready | Self::NotFound => true,
            Self::NotReady => false,
        }
    }
}

/// Boolean view handed back to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStatus {
    pub is_complete: bool,
}

impl From<Completion> for CompletionStatus {
    fn from(completion: Completion) -> Self {
        Self {
            is_complete: completion.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_parse_is_case_insensitive() {
        assert_eq!("Create".parse::<Operation>().unwrap(), Operation::Create);
        assert_eq!("UPDATE".parse::<Operation>().unwrap(), Operation::Update);
        assert_eq!("delete".parse::<Operation>().unwrap(), Operation::Delete);
        assert!("Replace".parse::<Operation>().is_err());
    }

    #[test]
    fn test_request_deserialize() {
        let json = r#"{
            "operation": "Update",
            "resource_identifier": "arn:endpoint/abc",
            "properties": {"documentclassifierarn": "arn:classifier/v2"}
        }"#;
        let req: ProvisioningRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.operation, Operation::Update);
        assert_eq!(req.require_identifier().unwrap(), "arn:endpoint/abc");
        assert_eq!(req.model_arn().unwrap(), "arn:classifier/v2");
    }

    #[test]
    fn test_model_arn_falls_back_to_model_reference() {
        let mut req = ProvisioningRequest::delete("x");
        req.properties
            .insert("modelReference".to_string(), Value::String("model-A".into()));
        assert_eq!(req.model_arn().unwrap(), "model-A");
    }

    #[test]
    fn test_model_arn_rejects_missing_and_non_string() {
        let req = ProvisioningRequest::delete("x");
        assert!(matches!(req.model_arn(), Err(AppError::Validation(_))));

        let mut req = ProvisioningRequest::create("ignored");
        req.properties
            .insert("documentclassifierarn".to_string(), Value::from(42));
        assert!(matches!(req.model_arn(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_require_identifier() {
        let req = ProvisioningRequest::create("model");
        assert!(req.require_identifier().is_err());

        let mut req = ProvisioningRequest::delete("  ");
        assert!(req.require_identifier().is_err());
        req.resource_identifier = Some("arn:endpoint/1".to_string());
        assert_eq!(req.require_identifier().unwrap(), "arn:endpoint/1");
    }

    #[test]
    fn test_completion_to_status() {
        assert!(CompletionStatus::from(Completion::Ready).is_complete);
        assert!(CompletionStatus::from(Completion::NotFound).is_complete);
        assert!(!CompletionStatus::from(Completion::NotReady).is_complete);
    }
}
