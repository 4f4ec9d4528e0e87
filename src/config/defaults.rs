//! Default value functions for configuration.

pub fn default_command_prefix() -> String {
    "!".to_string()
}

pub fn default_voice_channel_prefix() -> String {
    "PV: ".to_string()
}

/// Sweep interval, seconds.
pub fn default_ticker_delay() -> u64 {
    30
}

/// Grace period for channels nobody joined, seconds.
pub fn default_unjoined_channel_delete_delay() -> u64 {
    30
}
