//! Gateway facade - everything the daemon asks of the chat platform.
//!
//! The core only talks to [`Gateway`]; the serenity-backed implementation
//! lives in [`discord`] and tests use [`mock::MockGateway`].

mod discord;
#[cfg(test)]
pub mod mock;
mod refresh;

pub use discord::DiscordGateway;
pub use refresh::{Refreshable, cached_or_refetch};

use crate::error::GatewayError;
use crate::metrics;
use async_trait::async_trait;
use pvoice_proto::{ChannelId, Grant, GuildId, RoleId, UserId};
use tracing::warn;

/// Log and count a failed platform call.
pub fn report_failure(operation: &'static str, err: &GatewayError) {
    metrics::record_gateway_error(operation, err.error_code());
    warn!(operation, error = %err, "Platform call failed");
}

/// Target of a permission overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Member(UserId),
    Role(RoleId),
}

/// A voice channel as seen in a guild snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChannelInfo {
    pub id: ChannelId,
    pub name: String,
}

/// One user sitting in a voice channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoicePresence {
    pub user_id: UserId,
    pub channel_id: ChannelId,
}

/// Voice channels and voice states of one guild.
#[derive(Debug, Clone, Default)]
pub struct GuildSnapshot {
    pub voice_channels: Vec<VoiceChannelInfo>,
    pub voice_states: Vec<VoicePresence>,
    /// False when the snapshot was rebuilt over REST, which carries no
    /// voice states. Occupancy counts are meaningless then.
    pub presence_known: bool,
}

impl GuildSnapshot {
    /// Number of users currently inside `channel`.
    pub fn occupants(&self, channel: ChannelId) -> usize {
        self.voice_states
            .iter()
            .filter(|v| v.channel_id == channel)
            .count()
    }
}

/// Platform operations used by the dispatcher, reactor and sweeper.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<(), GatewayError>;

    async fn create_voice_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<ChannelId, GatewayError>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), GatewayError>;

    /// Ask the platform directly, bypassing the cache.
    async fn channel_exists(&self, channel: ChannelId) -> Result<bool, GatewayError>;

    async fn set_channel_permission(
        &self,
        channel: ChannelId,
        subject: Subject,
        grant: Grant,
    ) -> Result<(), GatewayError>;

    /// Cache first, direct fetch on a miss.
    async fn guild_snapshot(&self, guild: GuildId) -> Result<GuildSnapshot, GatewayError>;

    /// Voice channel `user` is sitting in, if any.
    ///
    /// `Unavailable` when the guild's voice states are not known.
    async fn voice_presence(
        &self,
        user: UserId,
        guild: GuildId,
    ) -> Result<Option<ChannelId>, GatewayError>;

    async fn disconnect_member(&self, guild: GuildId, user: UserId) -> Result<(), GatewayError>;
}
