//! Per-channel bookkeeping.

use chrono::{DateTime, TimeDelta, Utc};
use pvoice_proto::{ChannelId, GuildId, UserId};
use std::collections::HashSet;

/// One private voice channel created by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChannelRecord {
    pub guild_id: GuildId,
    /// Registry key.
    pub channel_id: ChannelId,
    /// Creator. Never changes and never appears in `operators`.
    pub owner_id: UserId,
    /// `<voicePrefix><title>` as shown on the platform.
    pub display_name: String,
    pub operators: HashSet<UserId>,
    /// Set once anyone has been seen inside. Never reset.
    pub occupied: bool,
    pub created_at: DateTime<Utc>,
}

impl VoiceChannelRecord {
    pub fn new(
        guild_id: GuildId,
        channel_id: ChannelId,
        owner_id: UserId,
        display_name: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            guild_id,
            channel_id,
            owner_id,
            display_name,
            operators: HashSet::new(),
            occupied: false,
            created_at,
        }
    }

    /// Unjoined for at least `delay`.
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>, delay: TimeDelta) -> bool {
        !self.occupied && self.created_at + delay <= now
    }
}
