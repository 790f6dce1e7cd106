//! Endpoint Provisioner CLI
//!
//! Local execution entry point: runs the same lifecycle handler and completion
//! poller the Lambda functions use, against Amazon Comprehend with the ambient
//! AWS credentials. `--dry-run` swaps in the in-memory control plane, where
//! endpoints only live for the duration of one command. For AWS Lambda, use
//! `on-event` and `is-complete`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use endpoint_provisioner::{
    error::Result,
    models::{CompletionQuery, CompletionStatus, ProvisionerConfig, ProvisioningRequest},
    pipeline::{CompletionPoller, LifecycleHandler, wait_for_completion},
    services::{ComprehendControlPlane, EndpointControlPlane, InMemoryControlPlane},
};

/// Provision Comprehend classifier endpoints
#[derive(Parser, Debug)]
#[command(
    name = "endpoint-provisioner",
    version,
    about = "Create, update and delete Comprehend classifier endpoints"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "provisioner.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run against a process-local simulated control plane instead of Comprehend
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an endpoint serving a classifier model
    Create {
        /// Document classifier ARN
        #[arg(long)]
        model_arn: String,

        /// Poll until the endpoint is in service
        #[arg(long)]
        wait: bool,
    },

    /// Point an existing endpoint at another model
    Update {
        #[arg(long)]
        endpoint_arn: String,

        /// Document classifier ARN
        #[arg(long)]
        model_arn: String,

        /// Poll until the update settles
        #[arg(long)]
        wait: bool,
    },

    /// Delete an endpoint
    Delete {
        #[arg(long)]
        endpoint_arn: String,

        /// Poll until the deletion is acknowledged
        #[arg(long)]
        wait: bool,
    },

    /// Poll an endpoint once and print its completion status
    Status {
        #[arg(long)]
        endpoint_arn: String,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build the handler and poller over one control plane client.
async fn connect(
    config: &ProvisionerConfig,
    dry_run: bool,
) -> (LifecycleHandler, CompletionPoller) {
    let control_plane: Arc<dyn EndpointControlPlane> = if dry_run {
        log::info!("Dry run: endpoints are simulated in memory");
        Arc::new(InMemoryControlPlane::new())
    } else {
        Arc::new(ComprehendControlPlane::from_env().await)
    };
    (
        LifecycleHandler::new(control_plane.clone(), config.endpoint.clone()),
        CompletionPoller::new(control_plane, config.poller.fail_open_on_error),
    )
}

/// Run one lifecycle operation, optionally waiting for it to settle.
async fn provision(
    config: &ProvisionerConfig,
    request: ProvisioningRequest,
    wait: bool,
    dry_run: bool,
) -> Result<()> {
    let (handler, poller) = connect(config, dry_run).await;

    let result = handler.handle(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if wait {
        log::info!(
            "Waiting for {} (every {}s, up to {}s)...",
            result.resource_identifier,
            config.poller.interval_secs,
            config.poller.timeout_secs
        );
        let completion = wait_for_completion(
            &poller,
            &CompletionQuery::new(&result.resource_identifier),
            config.poller.interval(),
            config.poller.timeout(),
        )
        .await?;
        log::info!("✓ {} settled: {:?}", result.resource_identifier, completion);
    }

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ProvisionerConfig::load_or_default(&cli.config);
    config.apply_env_overrides()?;

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let dry_run = cli.dry_run;
    match cli.command {
        Command::Validate => {
            log::info!("✓ Config OK ({})", cli.config.display());
            Ok(())
        }
        Command::Status { endpoint_arn } => {
            let (_, poller) = connect(&config, dry_run).await;
            let completion = poller.poll(&CompletionQuery::new(endpoint_arn)).await?;
            log::info!("{:?}", completion);
            println!(
                "{}",
                serde_json::to_string_pretty(&CompletionStatus::from(completion))?
            );
            Ok(())
        }
        Command::Create { model_arn, wait } => {
            provision(&config, ProvisioningRequest::create(model_arn), wait, dry_run).await
        }
        Command::Update {
            endpoint_arn,
            model_arn,
            wait,
        } => {
            provision(
                &config,
                ProvisioningRequest::update(endpoint_arn, model_arn),
                wait,
                dry_run,
            )
            .await
        }
        Command::Delete { endpoint_arn, wait } => {
            provision(&config, ProvisioningRequest::delete(endpoint_arn), wait, dry_run).await
        }
    }
}
