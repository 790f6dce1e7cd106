//! AWS Lambda `onEvent` handler for the endpoint custom resource.
//!
//! Deploy with `cargo lambda build --release --features lambda --bin on-event`.
//!
//! ## Environment Variables
//!
//! - `ENDPOINT_NAME_PREFIX`: Prefix for generated endpoint names (default: `comprehend-endpoint`)
//! - `DESIRED_INFERENCE_UNITS`: Inference units per endpoint (default: `1`)
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use endpoint_provisioner::lambda::Provisioner;
use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Endpoint provisioner onEvent starting...");

    let provisioner = Provisioner::from_env().await?;
    let provisioner = &provisioner;
    lambda_runtime::run(service_fn(move |event| async move {
        provisioner.on_event(event).await
    }))
    .await
}
