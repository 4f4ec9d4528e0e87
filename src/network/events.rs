//! Serenity event bridge.
//!
//! Converts gateway events into the daemon's own types and hands them to
//! the dispatcher (chat messages) or the reactor (voice state changes).

use crate::handlers::{Author, Dispatcher, IncomingMessage};
use crate::lifecycle::{Reactor, VoiceStateChange};
use crate::state::Switchboard;
use async_trait::async_trait;
use pvoice_proto::{ChannelId, GuildId, UserId};
use serenity::all::{Context as SerenityContext, EventHandler, Message, Ready, VoiceState};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Shared state is only available once the client exists, so the bridge
/// starts with an empty slot that `run` fills before connecting.
pub type SwitchboardSlot = Arc<OnceLock<Arc<Switchboard>>>;

pub struct EventBridge {
    switchboard: SwitchboardSlot,
    dispatcher: Arc<Dispatcher>,
    reactor: Reactor,
}

impl EventBridge {
    pub fn new(switchboard: SwitchboardSlot, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            switchboard,
            dispatcher,
            reactor: Reactor::new(),
        }
    }
}

/// Extract the fields commands need from a serenity message.
pub fn incoming_message(msg: &Message) -> IncomingMessage {
    let mut mentions = Vec::with_capacity(msg.mentions.len());
    for user in &msg.mentions {
        let id = UserId::new(user.id.get());
        if !mentions.contains(&id) {
            mentions.push(id);
        }
    }

    let name = msg
        .member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .or_else(|| msg.author.global_name.clone())
        .unwrap_or_else(|| msg.author.name.clone());

    IncomingMessage {
        guild_id: msg.guild_id.map(|g| GuildId::new(g.get())),
        channel_id: ChannelId::new(msg.channel_id.get()),
        author: Author {
            id: UserId::new(msg.author.id.get()),
            name,
        },
        content: msg.content.clone(),
        mentions,
    }
}

/// `None` for voice states outside a guild.
pub fn voice_state_change(state: &VoiceState) -> Option<VoiceStateChange> {
    Some(VoiceStateChange {
        guild_id: GuildId::new(state.guild_id?.get()),
        user_id: UserId::new(state.user_id.get()),
        channel_id: state.channel_id.map(|c| ChannelId::new(c.get())),
    })
}

#[async_trait]
impl EventHandler for EventBridge {
    async fn ready(&self, _: SerenityContext, ready: Ready) {
        if let Some(sb) = self.switchboard.get() {
            sb.set_bot_user(UserId::new(ready.user.id.get()));
        }
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Connected to gateway"
        );
    }

    async fn message(&self, _: SerenityContext, msg: Message) {
        let Some(sb) = self.switchboard.get() else {
            return;
        };
        // Errors are logged and answered by the dispatcher.
        let _ = self.dispatcher.dispatch(sb, &incoming_message(&msg)).await;
    }

    async fn voice_state_update(
        &self,
        _: SerenityContext,
        _old: Option<VoiceState>,
        new: VoiceState,
    ) {
        let Some(sb) = self.switchboard.get() else {
            return;
        };
        let Some(change) = voice_state_change(&new) else {
            return;
        };
        let outcome = self.reactor.on_voice_state_update(sb, change).await;
        debug!(
            occupied = outcome.marked_occupied,
            destroyed = outcome.destroyed.len(),
            orphans = outcome.orphans.len(),
            vanished = outcome.vanished.len(),
            skipped = outcome.skipped,
            "Voice pass finished"
        );
    }
}
