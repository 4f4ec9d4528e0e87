//! In-process platform double for tests.
//!
//! Keeps a tiny model of one guild (voice channels plus who sits where)
//! and records every call made against it.

use super::{Gateway, GuildSnapshot, Subject, VoiceChannelInfo, VoicePresence};
use crate::error::GatewayError;
use async_trait::async_trait;
use parking_lot::Mutex;
use pvoice_proto::{ChannelId, Grant, GuildId, UserId};
use std::collections::{HashMap, HashSet};

/// First id handed out by `create_voice_channel`.
const FIRST_CHANNEL_ID: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SendMessage { channel: ChannelId, text: String },
    CreateVoiceChannel { guild: GuildId, name: String },
    DeleteChannel(ChannelId),
    SetPermission { channel: ChannelId, subject: Subject, grant: Grant },
    Disconnect { guild: GuildId, user: UserId },
}

#[derive(Debug)]
struct State {
    calls: Vec<Call>,
    channels: Vec<VoiceChannelInfo>,
    presence: HashMap<UserId, ChannelId>,
    presence_known: bool,
    /// Channels that exist but are missing from snapshots.
    uncached: HashSet<ChannelId>,
    /// Users whose presence lookups fail.
    presence_hidden: HashSet<UserId>,
    failing: HashSet<&'static str>,
    next_id: u64,
}

#[derive(Debug)]
pub struct MockGateway {
    state: Mutex<State>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                calls: Vec::new(),
                channels: Vec::new(),
                presence: HashMap::new(),
                presence_known: true,
                uncached: HashSet::new(),
                presence_hidden: HashSet::new(),
                failing: HashSet::new(),
                next_id: FIRST_CHANNEL_ID,
            }),
        }
    }

    // ------------------------------------------------------------------
    // World setup
    // ------------------------------------------------------------------

    /// Put an existing voice channel on the platform.
    pub fn add_channel(&self, id: ChannelId, name: &str) {
        self.state.lock().channels.push(VoiceChannelInfo {
            id,
            name: name.to_string(),
        });
    }

    /// Delete a channel behind the daemon's back.
    pub fn remove_channel(&self, id: ChannelId) {
        let mut state = self.state.lock();
        state.channels.retain(|c| c.id != id);
        state.presence.retain(|_, c| *c != id);
    }

    /// Keep `id` on the platform but out of guild snapshots.
    pub fn hide_from_cache(&self, id: ChannelId) {
        self.state.lock().uncached.insert(id);
    }

    /// Make presence lookups for `user` fail.
    pub fn hide_presence(&self, user: UserId) {
        self.state.lock().presence_hidden.insert(user);
    }

    pub fn join(&self, user: UserId, channel: ChannelId) {
        self.state.lock().presence.insert(user, channel);
    }

    pub fn leave(&self, user: UserId) {
        self.state.lock().presence.remove(&user);
    }

    /// Serve snapshots without voice states, like the REST fallback.
    pub fn lose_presence(&self) {
        self.state.lock().presence_known = false;
    }

    /// Make every call to `op` fail with an HTTP error.
    pub fn fail(&self, op: &'static str) {
        self.state.lock().failing.insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.state.lock().failing.remove(op);
    }

    pub fn has_channel(&self, id: ChannelId) -> bool {
        self.state.lock().channels.iter().any(|c| c.id == id)
    }

    // ------------------------------------------------------------------
    // Call inspection
    // ------------------------------------------------------------------

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendMessage { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn creates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateVoiceChannel { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<ChannelId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DeleteChannel(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn permissions(&self) -> Vec<(ChannelId, Subject, Grant)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetPermission { channel, subject, grant } => Some((channel, subject, grant)),
                _ => None,
            })
            .collect()
    }

    pub fn disconnects(&self) -> Vec<UserId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Disconnect { user, .. } => Some(user),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call, op: &'static str) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.failing.contains(op) {
            return Err(GatewayError::Http(format!("{op} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<(), GatewayError> {
        self.record(
            Call::SendMessage {
                channel,
                text: text.to_string(),
            },
            "send_message",
        )
    }

    async fn create_voice_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<ChannelId, GatewayError> {
        self.record(
            Call::CreateVoiceChannel {
                guild,
                name: name.to_string(),
            },
            "create_voice_channel",
        )?;
        let mut state = self.state.lock();
        let id = ChannelId::new(state.next_id);
        state.next_id += 1;
        state.channels.push(VoiceChannelInfo {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), GatewayError> {
        self.record(Call::DeleteChannel(channel), "delete_channel")?;
        let mut state = self.state.lock();
        let before = state.channels.len();
        state.channels.retain(|c| c.id != channel);
        if state.channels.len() == before {
            return Err(GatewayError::NotFound(format!("channel {channel}")));
        }
        state.presence.retain(|_, c| *c != channel);
        Ok(())
    }

    async fn channel_exists(&self, channel: ChannelId) -> Result<bool, GatewayError> {
        let state = self.state.lock();
        if state.failing.contains("channel_exists") {
            return Err(GatewayError::Http("channel_exists failed".into()));
        }
        Ok(state.channels.iter().any(|c| c.id == channel))
    }

    async fn set_channel_permission(
        &self,
        channel: ChannelId,
        subject: Subject,
        grant: Grant,
    ) -> Result<(), GatewayError> {
        self.record(
            Call::SetPermission {
                channel,
                subject,
                grant,
            },
            "set_channel_permission",
        )
    }

    async fn guild_snapshot(&self, _guild: GuildId) -> Result<GuildSnapshot, GatewayError> {
        let state = self.state.lock();
        if state.failing.contains("guild_snapshot") {
            return Err(GatewayError::Http("guild_snapshot failed".into()));
        }
        let voice_states = if state.presence_known {
            state
                .presence
                .iter()
                .map(|(user, channel)| VoicePresence {
                    user_id: *user,
                    channel_id: *channel,
                })
                .collect()
        } else {
            Vec::new()
        };
        Ok(GuildSnapshot {
            voice_channels: state
                .channels
                .iter()
                .filter(|c| !state.uncached.contains(&c.id))
                .cloned()
                .collect(),
            voice_states,
            presence_known: state.presence_known,
        })
    }

    async fn voice_presence(
        &self,
        user: UserId,
        _guild: GuildId,
    ) -> Result<Option<ChannelId>, GatewayError> {
        let state = self.state.lock();
        if state.failing.contains("voice_presence") || state.presence_hidden.contains(&user) {
            return Err(GatewayError::Unavailable("voice_state"));
        }
        Ok(state.presence.get(&user).copied())
    }

    async fn disconnect_member(&self, guild: GuildId, user: UserId) -> Result<(), GatewayError> {
        self.record(Call::Disconnect { guild, user }, "disconnect_member")?;
        self.state.lock().presence.remove(&user);
        Ok(())
    }
}
