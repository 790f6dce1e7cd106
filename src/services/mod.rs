//! Service layer for the provisioner.
//!
//! This module contains the control plane seam:
//! - The `EndpointControlPlane` trait the handler and poller depend on
//! - `ComprehendControlPlane` for Amazon Comprehend (feature `aws`)
//! - `InMemoryControlPlane` for local development and tests

#[cfg(feature = "aws")]
mod comprehend;
mod control_plane;
mod memory;

#[cfg(feature = "aws")]
pub use comprehend::ComprehendControlPlane;
pub use control_plane::{ControlPlaneError, EndpointControlPlane};
pub use memory::{ControlPlaneCall, InMemoryControlPlane, RecordedCall};
