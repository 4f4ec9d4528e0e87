//! Configuration validation.
//!
//! Validates settings at startup and produces the runtime [`BotConfig`].
//! All problems are reported at once so a bad file can be fixed in one pass.

use super::{BotConfig, Config};
use chrono::TimeDelta;
use pvoice_proto::MAX_CHANNEL_NAME_LEN;
use std::time::Duration;
use thiserror::Error;

/// Token written by the first-run template.
const PLACEHOLDER_TOKEN: &str = "YOUR_TOKEN_HERE";

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot_settings.token is required")]
    MissingToken,
    #[error("bot_settings.token still holds the template placeholder")]
    PlaceholderToken,
    #[error("bot_settings.commandPrefix must be exactly one character, got {0:?}")]
    InvalidCommandPrefix(String),
    #[error("bot_settings.voiceChannelPrefix must not be empty")]
    EmptyVoicePrefix,
    #[error("bot_settings.voiceChannelPrefix leaves no room for a title ({0} characters)")]
    VoicePrefixTooLong(usize),
    #[error("bot_settings.tickerDelay must be at least 1 second")]
    ZeroTickerDelay,
    #[error("bot_settings.unjoinedChannelDeleteDelay is out of range: {0}")]
    DeleteDelayOutOfRange(u64),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<BotConfig, Vec<ValidationError>> {
    let settings = &config.bot_settings;
    let mut errors = Vec::new();

    let token = settings.token.trim();
    if token.is_empty() {
        errors.push(ValidationError::MissingToken);
    } else if token == PLACEHOLDER_TOKEN {
        errors.push(ValidationError::PlaceholderToken);
    }

    let mut prefix_chars = settings.command_prefix.chars();
    let command_prefix = match (prefix_chars.next(), prefix_chars.next()) {
        (Some(c), None) if !c.is_whitespace() => Some(c),
        _ => {
            errors.push(ValidationError::InvalidCommandPrefix(
                settings.command_prefix.clone(),
            ));
            None
        }
    };

    // An empty prefix would make every voice channel in the guild look like ours.
    let voice_len = settings.voice_channel_prefix.chars().count();
    if voice_len == 0 {
        errors.push(ValidationError::EmptyVoicePrefix);
    } else if voice_len >= MAX_CHANNEL_NAME_LEN {
        errors.push(ValidationError::VoicePrefixTooLong(voice_len));
    }

    if settings.ticker_delay == 0 {
        errors.push(ValidationError::ZeroTickerDelay);
    }

    let unjoined_delete_delay = i64::try_from(settings.unjoined_channel_delete_delay)
        .ok()
        .and_then(TimeDelta::try_seconds);
    if unjoined_delete_delay.is_none() {
        errors.push(ValidationError::DeleteDelayOutOfRange(
            settings.unjoined_channel_delete_delay,
        ));
    }

    match (command_prefix, unjoined_delete_delay) {
        (Some(command_prefix), Some(unjoined_delete_delay)) if errors.is_empty() => Ok(BotConfig {
            command_prefix,
            voice_prefix: settings.voice_channel_prefix.clone(),
            ticker_delay: Duration::from_secs(settings.ticker_delay),
            unjoined_delete_delay,
        }),
        _ => Err(errors),
    }
}
