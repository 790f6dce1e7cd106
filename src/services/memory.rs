//! In-memory control plane for local development and testing.
//!
//! Endpoints advance through a scripted sequence of states, one step per
//! describe call, so tests can reproduce any polling history without touching
//! the network. Production deployments use `ComprehendControlPlane`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::models::{CreatedEndpoint, EndpointDescription, EndpointSpec, ExternalResourceState};
use crate::services::{ControlPlaneError, EndpointControlPlane};

const DEFAULT_ARN_PREFIX: &str =
    "arn:aws:comprehend:us-east-1:000000000000:document-classifier-endpoint/";

/// Control plane operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlPlaneCall {
    Create,
    Update,
    Delete,
    Describe,
}

/// A call the fake received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Create(EndpointSpec),
    Update {
        endpoint_arn: String,
        model_arn: String,
        desired_inference_units: i32,
    },
    Delete(String),
    Describe(String),
}

#[derive(Debug)]
struct Record {
    name: String,
    model_arn: String,
    current: ExternalResourceState,
    pending: VecDeque<ExternalResourceState>,
    removing: bool,
}

#[derive(Debug, Default)]
struct Inner {
    endpoints: HashMap<String, Record>,
    failures: HashMap<ControlPlaneCall, ControlPlaneError>,
    calls: Vec<RecordedCall>,
}

impl Inner {
    fn take_failure(&mut self, call: ControlPlaneCall) -> Result<(), ControlPlaneError> {
        match self.failures.remove(&call) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Scripted, process-local control plane.
#[derive(Debug)]
pub struct InMemoryControlPlane {
    arn_prefix: String,
    create_progression: Vec<ExternalResourceState>,
    update_progression: Vec<ExternalResourceState>,
    inner: Mutex<Inner>,
}

impl Default for InMemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryControlPlane {
    /// Endpoints report `CREATING` once, then `IN_SERVICE`.
    pub fn new() -> Self {
        Self {
            arn_prefix: DEFAULT_ARN_PREFIX.to_string(),
            create_progression: vec![
                ExternalResourceState::Creating,
                ExternalResourceState::InService,
            ],
            update_progression: vec![
                ExternalResourceState::Updating,
                ExternalResourceState::InService,
            ],
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Prefix prepended to the endpoint name to form its ARN.
    pub fn with_arn_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.arn_prefix = prefix.into();
        self
    }

    /// States reported by successive describes after a create. The last one sticks.
    pub fn with_create_progression(mut self, states: Vec<ExternalResourceState>) -> Self {
        self.create_progression = states;
        self
    }

    /// States reported by successive describes after an update. The last one sticks.
    pub fn with_update_progression(mut self, states: Vec<ExternalResourceState>) -> Self {
        self.update_progression = states;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of the given kind fail with `error`.
    pub fn fail_next(&self, call: ControlPlaneCall, error: ControlPlaneError) {
        self.lock().failures.insert(call, error);
    }

    /// Force an endpoint into `state`, discarding its scripted progression.
    pub fn set_state(&self, endpoint_arn: &str, state: ExternalResourceState) -> bool {
        match self.lock().endpoints.get_mut(endpoint_arn) {
            Some(record) => {
                record.current = state;
                record.pending.clear();
                record.removing = false;
                true
            }
            None => false,
        }
    }

    /// Drop an endpoint as if it was removed out of band.
    pub fn forget(&self, endpoint_arn: &str) -> bool {
        self.lock().endpoints.remove(endpoint_arn).is_some()
    }

    /// Model currently attached to an endpoint.
    pub fn model_of(&self, endpoint_arn: &str) -> Option<String> {
        self.lock()
            .endpoints
            .get(endpoint_arn)
            .map(|r| r.model_arn.clone())
    }

    /// Whether an endpoint is still known.
    pub fn contains(&self, endpoint_arn: &str) -> bool {
        self.lock().endpoints.contains_key(endpoint_arn)
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl EndpointControlPlane for InMemoryControlPlane {
    async fn create_endpoint(
        &self,
        spec: &EndpointSpec,
    ) -> Result<CreatedEndpoint, ControlPlaneError> {
        let mut inner = self.lock();
        inner.calls.push(RecordedCall::Create(spec.clone()));
        inner.take_failure(ControlPlaneCall::Create)?;

        if inner.endpoints.values().any(|r| r.name == spec.name) {
            return Err(ControlPlaneError::Service(format!(
                "ResourceInUseException: endpoint {} already exists",
                spec.name
            )));
        }

        let endpoint_arn = format!("{}{}", self.arn_prefix, spec.name);
        inner.endpoints.insert(
            endpoint_arn.clone(),
            Record {
                name: spec.name.clone(),
                model_arn: spec.model_arn.clone(),
                current: ExternalResourceState::Creating,
                pending: self.create_progression.iter().copied().collect(),
                removing: false,
            },
        );

        Ok(CreatedEndpoint {
            endpoint_arn,
            model_arn: Some(spec.model_arn.clone()),
        })
    }

    async fn update_endpoint(
        &self,
        endpoint_arn: &str,
        model_arn: &str,
        desired_inference_units: i32,
    ) -> Result<(), ControlPlaneError> {
        let mut inner = self.lock();
        inner.calls.push(RecordedCall::Update {
            endpoint_arn: endpoint_arn.to_string(),
            model_arn: model_arn.to_string(),
            desired_inference_units,
        });
        inner.take_failure(ControlPlaneCall::Update)?;

        let record = inner
            .endpoints
            .get_mut(endpoint_arn)
            .ok_or_else(|| ControlPlaneError::NotFound(endpoint_arn.to_string()))?;
        record.model_arn = model_arn.to_string();
        record.current = ExternalResourceState::Updating;
        record.pending = self.update_progression.iter().copied().collect();
        Ok(())
    }

    async fn delete_endpoint(&self, endpoint_arn: &str) -> Result<(), ControlPlaneError> {
        let mut inner = self.lock();
        inner
            .calls
            .push(RecordedCall::Delete(endpoint_arn.to_string()));
        inner.take_failure(ControlPlaneCall::Delete)?;

        let record = inner
            .endpoints
            .get_mut(endpoint_arn)
            .ok_or_else(|| ControlPlaneError::NotFound(endpoint_arn.to_string()))?;
        record.current = ExternalResourceState::Deleting;
        record.pending.clear();
        record.removing = true;
        Ok(())
    }

    async fn describe_endpoint(
        &self,
        endpoint_arn: &str,
    ) -> Result<EndpointDescription, ControlPlaneError> {
        let mut inner = self.lock();
        inner
            .calls
            .push(RecordedCall::Describe(endpoint_arn.to_string()));
        inner.take_failure(ControlPlaneCall::Describe)?;

        let record = inner
            .endpoints
            .get_mut(endpoint_arn)
            .ok_or_else(|| ControlPlaneError::NotFound(endpoint_arn.to_string()))?;

        // A deleting endpoint is reported once, then disappears.
        if record.removing {
            inner.endpoints.remove(endpoint_arn);
            return Ok(EndpointDescription {
                arn: endpoint_arn.to_string(),
                state: ExternalResourceState::Deleting,
                message: None,
            });
        }

        if let Some(next) = record.pending.pop_front() {
            record.current = next;
        }
        let message = (record.current == ExternalResourceState::Failed)
            .then(|| format!("model {} could not be deployed", record.model_arn));

        Ok(EndpointDescription {
            arn: endpoint_arn.to_string(),
            state: record.current,
            message,
        })
    }
}
