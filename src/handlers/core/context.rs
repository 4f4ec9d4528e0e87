//! Command handler context and core types.
//!
//! Defines the [`Context`] passed to every handler, the platform-neutral
//! [`IncomingMessage`] it wraps, and the [`Handler`] trait itself.

use crate::error::{HandlerError, HandlerResult};
use crate::gateway::report_failure;
use crate::state::{Switchboard, VoiceChannelRecord, is_authorized};
use async_trait::async_trait;
use pvoice_proto::{ChannelId, CommandRef, GuildId, UserId};

/// Who sent a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    /// Display name in the guild, used as the default channel title.
    pub name: String,
}

/// A chat message, stripped down to what commands need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    /// Where replies go.
    pub channel_id: ChannelId,
    pub author: Author,
    pub content: String,
    /// Mentioned users, deduplicated, in order of appearance.
    pub mentions: Vec<UserId>,
}

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// Shared daemon state.
    pub switchboard: &'a Switchboard,
    pub message: &'a IncomingMessage,
    /// The parsed command.
    pub command: CommandRef<'a>,
    /// Guild the message was sent in.
    pub guild: GuildId,
}

impl<'a> Context<'a> {
    #[inline]
    pub fn author(&self) -> UserId {
        self.message.author.id
    }

    #[inline]
    pub fn mentions(&self) -> &'a [UserId] {
        &self.message.mentions
    }

    /// Reply in the channel the command came from. Failures are logged only.
    pub async fn reply(&self, text: &str) {
        if let Err(e) = self
            .switchboard
            .gateway
            .send_message(self.message.channel_id, text)
            .await
        {
            report_failure("send_message", &e);
        }
    }

    /// Voice channel the author is sitting in right now.
    pub async fn actor_presence(&self) -> Result<Option<ChannelId>, HandlerError> {
        Ok(self
            .switchboard
            .gateway
            .voice_presence(self.author(), self.guild)
            .await?)
    }

    /// The tracked channel the author is sitting in.
    pub async fn occupied_channel(&self) -> Result<VoiceChannelRecord, HandlerError> {
        let presence = self.actor_presence().await?;
        self.switchboard
            .registry
            .find_by_member(presence)
            .ok_or(HandlerError::NotInPrivateChannel)
    }

    /// The tracked channel the author is sitting in, if they may manage it.
    pub async fn authorized_channel(&self) -> Result<VoiceChannelRecord, HandlerError> {
        let record = self.occupied_channel().await?;
        if !is_authorized(&record, self.author()) {
            return Err(HandlerError::NotAuthorized(record.channel_id));
        }
        Ok(record)
    }
}

/// A chat command implementation.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult;
}
