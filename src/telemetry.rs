//! Telemetry utilities for command timing and tracing spans.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use pvoice_proto::{ChannelId, GuildId, UserId};
    use tracing::{Span, info_span};

    /// Span for one dispatched chat command.
    pub fn command(name: &str, guild: GuildId, author: UserId) -> Span {
        info_span!("command", name = %name, guild = %guild, author = %author)
    }

    /// Span for one reactor pass over a guild.
    pub fn voice(guild: GuildId, user: UserId, channel: Option<ChannelId>) -> Span {
        match channel {
            Some(channel) => info_span!("voice", guild = %guild, user = %user, channel = %channel),
            None => info_span!("voice", guild = %guild, user = %user),
        }
    }

    /// Span for one expiration sweep.
    pub fn sweep() -> Span {
        info_span!("sweep")
    }
}
