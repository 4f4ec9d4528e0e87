//! The Switchboard - shared state handed to every event task.
//!
//! Bundles the registry, the platform gateway and the validated config, and
//! owns the one operation that must touch both sides: destroying a channel.

use super::{ChannelRegistry, VoiceChannelRecord};
use crate::config::BotConfig;
use crate::error::GatewayError;
use crate::gateway::{Gateway, report_failure};
use crate::metrics;
use pvoice_proto::{ChannelId, UserId};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Why a channel is being destroyed. Used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    /// `delete` command.
    Command,
    /// Emptied after someone had joined.
    Vacated,
    /// Never joined within the grace period.
    Expired,
    /// Prefixed channel the registry does not know about.
    Orphan,
    /// Already gone on the platform; only the record is dropped.
    Vanished,
}

impl DeleteReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Vacated => "vacated",
            Self::Expired => "expired",
            Self::Orphan => "orphan",
            Self::Vanished => "vanished",
        }
    }
}

/// Central shared state.
pub struct Switchboard {
    pub registry: ChannelRegistry,
    pub gateway: Arc<dyn Gateway>,
    pub config: Arc<BotConfig>,
    bot_user: OnceLock<UserId>,
}

impl Switchboard {
    pub fn new(gateway: Arc<dyn Gateway>, config: Arc<BotConfig>) -> Self {
        Self {
            registry: ChannelRegistry::new(),
            gateway,
            config,
            bot_user: OnceLock::new(),
        }
    }

    /// Record the bot's own id. Later calls are ignored.
    pub fn set_bot_user(&self, id: UserId) {
        if self.bot_user.set(id).is_ok() {
            debug!(user = %id, "Bot identity set");
        }
    }

    pub fn bot_user(&self) -> Option<UserId> {
        self.bot_user.get().copied()
    }

    /// Remove a tracked channel from the registry and the platform.
    ///
    /// `Ok(None)` if the channel was not tracked (someone else got there
    /// first). On a platform failure the record is put back.
    pub async fn destroy_channel(
        &self,
        channel_id: ChannelId,
        reason: DeleteReason,
    ) -> Result<Option<VoiceChannelRecord>, GatewayError> {
        let Some(record) = self.registry.delete(channel_id) else {
            return Ok(None);
        };
        self.finish_deletion(record, reason).await.map(Some)
    }

    /// Platform half of a deletion whose registry half already happened.
    pub async fn finish_deletion(
        &self,
        record: VoiceChannelRecord,
        reason: DeleteReason,
    ) -> Result<VoiceChannelRecord, GatewayError> {
        match self.gateway.delete_channel(record.channel_id).await {
            Ok(()) => {}
            // Already gone; the platform is authoritative.
            Err(e) if e.is_not_found() => {
                debug!(channel = %record.channel_id, "Channel already deleted on platform");
            }
            Err(e) => {
                report_failure("delete_channel", &e);
                let channel = record.channel_id;
                match self.registry.restore(record) {
                    Ok(()) => warn!(channel = %channel, "Delete failed, record restored"),
                    Err(re) => warn!(channel = %channel, error = %re, "Delete failed, record dropped"),
                }
                return Err(e);
            }
        }

        metrics::record_channel_deleted(reason.as_str());
        info!(
            guild = %record.guild_id,
            channel = %record.channel_id,
            owner = %record.owner_id,
            name = %record.display_name,
            reason = reason.as_str(),
            "Channel deleted"
        );
        Ok(record)
    }

    /// Drop the record of `channel_id` if its platform channel is gone.
    ///
    /// Absence from a cached snapshot is not enough, so the platform is
    /// asked directly first. Returns whether the record was dropped.
    pub async fn forget_vanished(&self, channel_id: ChannelId) -> Result<bool, GatewayError> {
        if self.gateway.channel_exists(channel_id).await? {
            return Ok(false);
        }
        let Some(record) = self.registry.delete(channel_id) else {
            return Ok(false);
        };
        metrics::record_channel_deleted(DeleteReason::Vanished.as_str());
        info!(
            guild = %record.guild_id,
            channel = %record.channel_id,
            owner = %record.owner_id,
            name = %record.display_name,
            "Channel gone from platform, record dropped"
        );
        Ok(true)
    }

    /// Delete a prefixed channel nobody tracks.
    pub async fn delete_orphan(&self, channel_id: ChannelId, name: &str) {
        match self.gateway.delete_channel(channel_id).await {
            Ok(()) => {
                metrics::record_channel_deleted(DeleteReason::Orphan.as_str());
                info!(channel = %channel_id, name = %name, "Orphaned channel deleted");
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => report_failure("delete_channel", &e),
        }
    }
}
