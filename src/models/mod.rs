// src/models/mod.rs

//! Domain models for the provisioner.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod endpoint;
mod provisioning;

// Re-export all public types
pub use config::{
    ENDPOINT_NAME_SUFFIX_LEN, EndpointConfig, MAX_ENDPOINT_NAME_LEN, PollerConfig,
    ProvisionerConfig,
};
pub use endpoint::{
    CreatedEndpoint, EndpointDescription, EndpointSpec, ExternalResourceState, UnknownStateError,
};
pub use provisioning::{
    Completion, CompletionQuery, CompletionStatus, MODEL_PROPERTY_KEYS, Operation,
    ProvisioningRequest, ProvisioningResult,
};
