//! First-run settings template.

use super::ConfigError;
use std::path::Path;

/// Written when no settings file exists. The daemon exits afterwards.
pub const TEMPLATE: &str = r#"# pvoiced settings

[bot_settings]
# Bot token from the developer portal.
token = "YOUR_TOKEN_HERE"
# Single character every command starts with.
commandPrefix = "!"
# Prepended to the name of every channel the bot creates.
voiceChannelPrefix = "PV: "
# Seconds between sweeps for channels nobody joined.
tickerDelay = 30
# Seconds a new channel may stay empty before it is deleted.
unjoinedChannelDeleteDelay = 30

[metrics]
# Serve Prometheus metrics on this port. Omit or set to 0 to disable.
# port = 9090
"#;

/// Write [`TEMPLATE`] to `path`. Refuses to overwrite an existing file.
pub fn write_template<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(TEMPLATE.as_bytes())?;
    Ok(())
}
