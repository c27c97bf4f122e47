//! deltaflip — webhook-triggered position-flip bot entry point.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use deltaflip_bot::server::{run_server, AppState};
use deltaflip_bot::{AppConfig, Credentials};
use deltaflip_client::{ClientConfig, DeltaClient};
use deltaflip_reconciler::Reconciler;
use tracing::info;

/// Webhook-triggered position-flip bot for Delta Exchange.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via DELTAFLIP_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    deltaflip_bot::logging::init_logging();

    info!("Starting deltaflip v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.config {
        Some(path) => AppConfig::from_file(&path)?,
        None => AppConfig::load()?,
    }
    .with_env_overrides();
    info!(
        port = config.port,
        base_url = %config.base_url,
        source = ?config.reconciler.position_source,
        brackets = config.reconciler.use_brackets,
        "Configuration loaded"
    );

    let credentials = Credentials::from_env()?;

    let client_config = ClientConfig {
        base_url: config.base_url.clone(),
        api_key: credentials.api_key,
        api_secret: credentials.api_secret,
        timeout: Duration::from_secs(config.request_timeout_secs),
    };
    let client = Arc::new(DeltaClient::new(client_config)?);
    let reconciler = Arc::new(Reconciler::new(client, config.reconciler.clone()));

    run_server(AppState { reconciler }, config.port).await?;

    info!("Server stopped");
    Ok(())
}
