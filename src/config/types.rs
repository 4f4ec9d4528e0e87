//! Core configuration types and loading.

use super::defaults::{
    default_command_prefix, default_ticker_delay, default_unjoined_channel_delete_delay,
    default_voice_channel_prefix,
};
use chrono::TimeDelta;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings file contents.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot credentials and channel behavior.
    pub bot_settings: BotSettings,
    /// Optional Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// The `[bot_settings]` table.
///
/// Keys are camelCase on disk (`commandPrefix`, `tickerDelay`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSettings {
    /// Bot token used to authenticate with the gateway.
    pub token: String,
    /// Single character every command starts with.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Prepended to the name of every channel the bot creates.
    #[serde(default = "default_voice_channel_prefix")]
    pub voice_channel_prefix: String,
    /// Seconds between expiration sweeps.
    #[serde(default = "default_ticker_delay")]
    pub ticker_delay: u64,
    /// Seconds a channel may stay unjoined before it is deleted.
    #[serde(default = "default_unjoined_channel_delete_delay")]
    pub unjoined_channel_delete_delay: u64,
}

/// The `[metrics]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Port for the `/metrics` endpoint. Absent or 0 disables it.
    pub port: Option<u16>,
}

/// Validated runtime configuration shared by the dispatcher, reactor and sweeper.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub command_prefix: char,
    pub voice_prefix: String,
    pub ticker_delay: Duration,
    pub unjoined_delete_delay: TimeDelta,
}

impl BotConfig {
    /// Defaults without a token, for tests and tooling.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            command_prefix: '!',
            voice_prefix: default_voice_channel_prefix(),
            ticker_delay: Duration::from_secs(default_ticker_delay()),
            unjoined_delete_delay: TimeDelta::seconds(
                default_unjoined_channel_delete_delay() as i64,
            ),
        }
    }
}
