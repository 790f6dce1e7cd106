//! AWS Lambda `isComplete` handler for the endpoint custom resource.
//!
//! The provider framework calls this on a fixed interval after `onEvent`
//! until it reports `IsComplete: true`.
//!
//! ## Environment Variables
//!
//! - `FAIL_OPEN_ON_POLL_ERROR`: Report complete when DescribeEndpoint fails (default: `true`)
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use endpoint_provisioner::lambda::Provisioner;
use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Endpoint provisioner isComplete starting...");

    let provisioner = Provisioner::from_env().await?;
    let provisioner = &provisioner;
    lambda_runtime::run(service_fn(move |event| async move {
        provisioner.is_complete(event).await
    }))
    .await
}
