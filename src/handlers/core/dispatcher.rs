//! Command dispatch.
//!
//! The `Dispatcher` filters chat messages, routes recognized commands to
//! their handlers, and keeps per-command usage statistics.

use super::context::{Context, Handler, IncomingMessage};
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::channel::{
    DeleteHandler, DeopHandler, InviteHandler, KickHandler, LeaveHandler, NewHandler, OpHandler,
};
use crate::state::Switchboard;
use crate::telemetry::{CommandTimer, spans};
use pvoice_proto::{CommandKind, ProtocolError, parse_command};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug, trace, warn};

/// Routes chat commands to their handlers.
pub struct Dispatcher {
    handlers: HashMap<CommandKind, Box<dyn Handler>>,
    command_counts: HashMap<CommandKind, AtomicU64>,
}

impl Dispatcher {
    /// Create a dispatcher with every command registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<CommandKind, Box<dyn Handler>> = HashMap::new();

        handlers.insert(CommandKind::New, Box::new(NewHandler));
        handlers.insert(CommandKind::Delete, Box::new(DeleteHandler));

        // Access grants
        handlers.insert(CommandKind::Invite, Box::new(InviteHandler));
        handlers.insert(CommandKind::Allow, Box::new(InviteHandler));
        handlers.insert(CommandKind::Kick, Box::new(KickHandler));

        // Operator management
        handlers.insert(CommandKind::Op, Box::new(OpHandler));
        handlers.insert(CommandKind::Deop, Box::new(DeopHandler));
        handlers.insert(CommandKind::Leave, Box::new(LeaveHandler));

        let command_counts = handlers
            .keys()
            .map(|&kind| (kind, AtomicU64::new(0)))
            .collect();

        Self {
            handlers,
            command_counts,
        }
    }

    /// Usage counts of commands seen at least once, most used first.
    pub fn command_stats(&self) -> Vec<(&'static str, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(kind, count)| (kind.as_str(), count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        stats
    }

    /// Handle one chat message.
    ///
    /// Messages that are not commands return `Ok(())` without side effects.
    /// Refusals that warrant it are answered in chat before the error is
    /// returned.
    pub async fn dispatch(&self, sb: &Switchboard, msg: &IncomingMessage) -> HandlerResult {
        if sb.bot_user() == Some(msg.author.id) {
            return Ok(());
        }
        let Some(guild) = msg.guild_id else {
            return Ok(());
        };

        let command = match parse_command(sb.config.command_prefix, &msg.content) {
            Ok(command) => command,
            Err(ProtocolError::UnknownCommand(name)) => {
                trace!(command = %name, "Ignoring unknown command");
                return Ok(());
            }
            Err(_) => return Ok(()),
        };
        let kind = command.kind;
        let Some(handler) = self.handlers.get(&kind) else {
            return Ok(());
        };

        if let Some(counter) = self.command_counts.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let span = spans::command(kind.as_str(), guild, msg.author.id);
        let _timer = CommandTimer::new(kind.as_str());

        let result = if kind.requires_mentions() && msg.mentions.is_empty() {
            Err(HandlerError::NoMentions)
        } else {
            let ctx = Context {
                switchboard: sb,
                message: msg,
                command,
                guild,
            };
            handler.handle(&ctx).instrument(span.clone()).await
        };

        if let Err(ref e) = result {
            crate::metrics::record_command_error(kind.as_str(), e.error_code());
            let _guard = span.enter();
            if e.is_refusal() {
                debug!(error = %e, "Command refused");
            } else {
                warn!(error = %e, "Command failed");
            }
        }
        if let Some(reply) = result.as_ref().err().and_then(|e| e.user_reply(msg.author.id)) {
            if let Err(e) = sb.gateway.send_message(msg.channel_id, &reply).await {
                crate::gateway::report_failure("send_message", &e);
            }
        }

        result
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
