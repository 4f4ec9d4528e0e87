//! Serenity-backed [`Gateway`].

use super::{
    Gateway, GuildSnapshot, Refreshable, Subject, VoiceChannelInfo, VoicePresence,
    cached_or_refetch,
};
use crate::error::GatewayError;
use crate::metrics;
use async_trait::async_trait;
use pvoice_proto::{ChannelId, Grant, GuildId, UserId};
use serenity::all::{
    Cache, ChannelType, CreateChannel, GuildChannel, Http, PermissionOverwrite,
    PermissionOverwriteType, Permissions,
};
use serenity::model::id as sid;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Id conversion
// ============================================================================

fn to_guild(id: GuildId) -> sid::GuildId {
    sid::GuildId::new(id.get())
}

fn to_channel(id: ChannelId) -> sid::ChannelId {
    sid::ChannelId::new(id.get())
}

fn to_user(id: UserId) -> sid::UserId {
    sid::UserId::new(id.get())
}

fn from_channel(id: sid::ChannelId) -> ChannelId {
    ChannelId::new(id.get())
}

// ============================================================================
// Error classification
// ============================================================================

/// Map a serenity error onto [`GatewayError`], keyed by HTTP status.
fn classify(err: serenity::Error) -> GatewayError {
    let status = match &err {
        serenity::Error::Http(http) => http.status_code().map(|s| s.as_u16()),
        _ => None,
    };
    match status {
        Some(404) => GatewayError::NotFound(err.to_string()),
        Some(403) => GatewayError::Forbidden(err.to_string()),
        _ => GatewayError::Http(err.to_string()),
    }
}

fn voice_channels<'a>(
    channels: impl IntoIterator<Item = &'a GuildChannel>,
) -> Vec<VoiceChannelInfo> {
    channels
        .into_iter()
        .filter(|c| c.kind == ChannelType::Voice)
        .map(|c| VoiceChannelInfo {
            id: from_channel(c.id),
            name: c.name.clone(),
        })
        .collect()
}

// ============================================================================
// Refreshable entities
// ============================================================================

/// A guild's voice channels fetched over REST. Voice states are not
/// available this way.
pub struct GuildVoiceChannels(pub Vec<VoiceChannelInfo>);

#[async_trait]
impl Refreshable for GuildVoiceChannels {
    type Id = GuildId;
    type Source = Http;
    const KIND: &'static str = "guild";

    async fn refetch(http: &Http, id: GuildId) -> Result<Self, GatewayError> {
        let channels = to_guild(id).channels(http).await.map_err(classify)?;
        Ok(Self(voice_channels(channels.values())))
    }
}

/// The bot's own user id.
pub struct CurrentUserId(pub UserId);

#[async_trait]
impl Refreshable for CurrentUserId {
    type Id = ();
    type Source = Http;
    const KIND: &'static str = "current_user";

    async fn refetch(http: &Http, _: ()) -> Result<Self, GatewayError> {
        let user = http.get_current_user().await.map_err(classify)?;
        Ok(Self(UserId::new(user.id.get())))
    }
}

// ============================================================================
// Gateway implementation
// ============================================================================

/// [`Gateway`] over serenity's HTTP client and cache.
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }

    /// Fetch the bot's own identity. Fails on a bad token.
    pub async fn current_user(&self) -> Result<UserId, GatewayError> {
        let CurrentUserId(id) = CurrentUserId::refetch(&self.http, ()).await?;
        Ok(id)
    }

    fn cached_snapshot(&self, guild: GuildId) -> Option<GuildSnapshot> {
        let guild = self.cache.guild(to_guild(guild))?;
        let voice_states = guild
            .voice_states
            .values()
            .filter_map(|vs| {
                vs.channel_id.map(|channel| VoicePresence {
                    user_id: UserId::new(vs.user_id.get()),
                    channel_id: from_channel(channel),
                })
            })
            .collect();
        Some(GuildSnapshot {
            voice_channels: voice_channels(guild.channels.values()),
            voice_states,
            presence_known: true,
        })
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<(), GatewayError> {
        to_channel(channel)
            .say(&*self.http, text)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn create_voice_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<ChannelId, GatewayError> {
        let builder = CreateChannel::new(name).kind(ChannelType::Voice);
        let created = to_guild(guild)
            .create_channel(&*self.http, builder)
            .await
            .map_err(classify)?;
        Ok(from_channel(created.id))
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), GatewayError> {
        to_channel(channel)
            .delete(&*self.http)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn channel_exists(&self, channel: ChannelId) -> Result<bool, GatewayError> {
        match to_channel(channel).to_channel(&*self.http).await {
            Ok(_) => Ok(true),
            Err(e) => match classify(e) {
                GatewayError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn set_channel_permission(
        &self,
        channel: ChannelId,
        subject: Subject,
        grant: Grant,
    ) -> Result<(), GatewayError> {
        let kind = match subject {
            Subject::Member(user) => PermissionOverwriteType::Member(to_user(user)),
            Subject::Role(role) => {
                PermissionOverwriteType::Role(sid::RoleId::new(role.get()))
            }
        };
        let overwrite = PermissionOverwrite {
            allow: Permissions::from_bits_truncate(grant.allow()),
            deny: Permissions::from_bits_truncate(grant.deny()),
            kind,
        };
        to_channel(channel)
            .create_permission(&*self.http, overwrite)
            .await
            .map_err(classify)
    }

    async fn guild_snapshot(&self, guild: GuildId) -> Result<GuildSnapshot, GatewayError> {
        if let Some(snapshot) = self.cached_snapshot(guild) {
            return Ok(snapshot);
        }

        let GuildVoiceChannels(voice_channels) =
            cached_or_refetch::<GuildVoiceChannels>(None, &self.http, guild).await?;
        Ok(GuildSnapshot {
            voice_channels,
            voice_states: Vec::new(),
            presence_known: false,
        })
    }

    async fn voice_presence(
        &self,
        user: UserId,
        guild: GuildId,
    ) -> Result<Option<ChannelId>, GatewayError> {
        let Some(cached) = self.cache.guild(to_guild(guild)) else {
            // Voice states only arrive over the gateway; there is nothing to fetch.
            metrics::record_cache_miss("voice_state");
            debug!(guild = %guild, user = %user, "Guild not cached, presence unknown");
            return Err(GatewayError::Unavailable("voice_state"));
        };
        Ok(cached
            .voice_states
            .get(&to_user(user))
            .and_then(|vs| vs.channel_id)
            .map(from_channel))
    }

    async fn disconnect_member(&self, guild: GuildId, user: UserId) -> Result<(), GatewayError> {
        to_guild(guild)
            .disconnect_member(&*self.http, to_user(user))
            .await
            .map(|_| ())
            .map_err(classify)
    }
}
