//! pvoiced - Private Voice Channel Daemon
//!
//! Lets guild members spawn private voice channels they own and manage,
//! and removes those channels once they are abandoned.

mod config;
mod error;
mod gateway;
mod handlers;
mod http;
mod lifecycle;
mod metrics;
mod network;
mod state;
mod telemetry;

use crate::config::{Config, validate, write_template};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "settings.toml".to_string());

    if !Path::new(&config_path).exists() {
        write_template(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to write settings template");
            e
        })?;
        warn!(path = %config_path, "No settings found; wrote a template. Fill in the token and restart");
        return Ok(());
    }

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    let bot_config = validate(&config).map_err(|errors| {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid configuration");
        }
        anyhow::anyhow!("{} configuration error(s) in {}", errors.len(), config_path)
    })?;

    info!(
        prefix = %bot_config.command_prefix,
        voice_prefix = %bot_config.voice_prefix,
        ticker_secs = bot_config.ticker_delay.as_secs(),
        grace_secs = bot_config.unjoined_delete_delay.num_seconds(),
        "Starting pvoiced"
    );

    metrics::init();

    // Capacity covers the sweeper, the shard stopper and the metrics server.
    let (shutdown_tx, _) = broadcast::channel(16);

    if let Some(port) = config.metrics.port.filter(|p| *p != 0) {
        tokio::spawn(http::run_http_server(port, shutdown_tx.subscribe()));
    }

    network::run(&config.bot_settings.token, Arc::new(bot_config), shutdown_tx).await
}
