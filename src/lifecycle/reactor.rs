//! Voice-presence reactor.
//!
//! Every voice state change in a guild triggers one pass: the destination
//! channel is marked occupied, then every empty prefixed voice channel in
//! the guild is examined and removed if it has been vacated, has expired,
//! or is not tracked at all. Tracked channels that no longer exist on the
//! platform have their records dropped.

use crate::gateway::report_failure;
use crate::state::{DeleteReason, Switchboard};
use crate::telemetry::spans;
use chrono::Utc;
use dashmap::DashMap;
use pvoice_proto::{ChannelId, GuildId, UserId, has_voice_prefix};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, debug};

/// A user moved between voice channels (or joined, or left).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceStateChange {
    pub guild_id: GuildId,
    pub user_id: UserId,
    /// Destination channel. `None` when the user left voice.
    pub channel_id: Option<ChannelId>,
}

/// What one pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReactorOutcome {
    /// The destination channel flipped to occupied.
    pub marked_occupied: bool,
    /// Tracked channels destroyed.
    pub destroyed: Vec<ChannelId>,
    /// Untracked prefixed channels deleted.
    pub orphans: Vec<ChannelId>,
    /// Records dropped because their channel no longer exists.
    pub vanished: Vec<ChannelId>,
    /// Cleanup skipped because voice states were unavailable.
    pub skipped: bool,
}

/// Reacts to voice state changes.
#[derive(Default)]
pub struct Reactor {
    /// Passes over the same guild run one at a time so two events never
    /// race to delete the same channel.
    guild_locks: DashMap<GuildId, Arc<Mutex<()>>>,
}

impl Reactor {
    pub fn new() -> Self {
        Self::default()
    }

    fn guild_lock(&self, guild: GuildId) -> Arc<Mutex<()>> {
        self.guild_locks.entry(guild).or_default().clone()
    }

    pub async fn on_voice_state_update(
        &self,
        sb: &Switchboard,
        change: VoiceStateChange,
    ) -> ReactorOutcome {
        let span = spans::voice(change.guild_id, change.user_id, change.channel_id);
        self.run_pass(sb, change).instrument(span).await
    }

    async fn run_pass(&self, sb: &Switchboard, change: VoiceStateChange) -> ReactorOutcome {
        let mut outcome = ReactorOutcome::default();
        let guild = change.guild_id;

        if let Some(channel) = change.channel_id
            && sb.registry.mark_occupied(channel)
        {
            debug!(channel = %channel, "Channel occupied");
            outcome.marked_occupied = true;
        }

        let lock = self.guild_lock(guild);
        let _pass = lock.lock().await;

        let snapshot = match sb.gateway.guild_snapshot(guild).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                report_failure("guild_snapshot", &e);
                return outcome;
            }
        };
        if !snapshot.presence_known {
            debug!("Voice states unknown, skipping cleanup");
            outcome.skipped = true;
            return outcome;
        }

        let now = Utc::now();
        let config = &sb.config;
        let empty = snapshot
            .voice_channels
            .iter()
            .filter(|c| has_voice_prefix(&c.name, &config.voice_prefix))
            .filter(|c| snapshot.occupants(c.id) == 0);

        for channel in empty {
            match sb.registry.get(channel.id) {
                Some(record) => {
                    let reason = if record.occupied {
                        DeleteReason::Vacated
                    } else if record.is_expired(now, config.unjoined_delete_delay) {
                        DeleteReason::Expired
                    } else {
                        continue;
                    };
                    // Failures are logged and rolled back inside.
                    if let Ok(Some(_)) = sb.destroy_channel(channel.id, reason).await {
                        outcome.destroyed.push(channel.id);
                    }
                }
                None => {
                    // A channel being created right now is not tracked yet.
                    if sb.registry.has_pending_in(guild) {
                        continue;
                    }
                    sb.delete_orphan(channel.id, &channel.name).await;
                    outcome.orphans.push(channel.id);
                }
            }
        }

        // Records whose channel was deleted outside the daemon, or whose
        // delete went through after reporting a failure.
        let listed: HashSet<ChannelId> = snapshot.voice_channels.iter().map(|c| c.id).collect();
        let unlisted = sb
            .registry
            .snapshot()
            .into_iter()
            .filter(|r| r.guild_id == guild && !listed.contains(&r.channel_id));
        for record in unlisted {
            match sb.forget_vanished(record.channel_id).await {
                Ok(true) => outcome.vanished.push(record.channel_id),
                Ok(false) => {}
                Err(e) => report_failure("channel_exists", &e),
            }
        }

        outcome
    }
}
