//! paramstore binary
//!
//! Batched access to a remote parameter store from the command line.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! paramstore --config paramstore.yaml get /app/db/host /app/db/port
//!
//! # With environment variables only
//! PARAMSTORE_CLIENT__REGION=eu-west-1 paramstore glob '/app/*/host'
//!
//! # Against the in-memory backend
//! PARAMSTORE_STORAGE__BACKEND=memory paramstore ls /app
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use paramstore_cli::observability::{init_logging, LoggingConfig};
use paramstore_cli::{run, Command};
use paramstore_client::{ClientConfig, ParameterClient};
use paramstore_domain::CallContext;
use paramstore_storage::{MemoryParameterStore, ParameterStore};

/// paramstore - batched parameter store client
#[derive(Parser, Debug)]
#[command(name = "paramstore")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = if let Some(config_path) = &args.config {
        ClientConfig::load(config_path)?
    } else {
        ClientConfig::from_env()?
    };

    init_logging(LoggingConfig::from(&config.logging));

    let ctx = CallContext::new();
    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling in-flight requests");
            token.cancel();
        }
    });

    let store = open_store(&config).await?;
    let client = ParameterClient::from_config(store, &config)?;

    let mut stdout = std::io::stdout().lock();
    run(&client, &ctx, args.command, &mut stdout).await
}

/// Opens the storage backend named in the configuration.
async fn open_store(config: &ClientConfig) -> anyhow::Result<Arc<dyn ParameterStore>> {
    match config.storage.backend.as_str() {
        "memory" => {
            info!("Using in-memory storage backend");
            let store: Arc<dyn ParameterStore> = Arc::new(MemoryParameterStore::new());
            Ok(store)
        }
        #[cfg(feature = "ssm")]
        "ssm" => {
            use paramstore_storage::{SsmConfig, SsmParameterStore};

            let ssm_config = SsmConfig {
                region: config.client.region.clone(),
                endpoint_url: config.storage.endpoint_url.clone(),
            };
            info!(region = %ssm_config.region, "Using SSM storage backend");
            let store: Arc<dyn ParameterStore> =
                Arc::new(SsmParameterStore::from_config(&ssm_config).await);
            Ok(store)
        }
        other => {
            error!("Storage backend not available in this build: {}", other);
            anyhow::bail!("storage backend not available in this build: {other}");
        }
    }
}
