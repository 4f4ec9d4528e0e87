//! `new` - create a private voice channel.

use crate::error::{HandlerError, HandlerResult};
use crate::gateway::{Subject, report_failure};
use crate::handlers::{Context, Handler};
use crate::metrics;
use crate::state::VoiceChannelRecord;
use async_trait::async_trait;
use chrono::Utc;
use pvoice_proto::{Grant, compose_channel_name};
use tracing::{debug, info};

/// Handler for `new [title]`.
///
/// Eligibility: the author owns no channel and is not sitting in a tracked
/// one. The owner slot is reserved before any platform call so two racing
/// `new` commands from the same user cannot both succeed.
pub struct NewHandler;

#[async_trait]
impl Handler for NewHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let sb = ctx.switchboard;
        let author = ctx.author();

        let title = ctx
            .command
            .title()
            .unwrap_or(ctx.message.author.name.as_str());
        let name = compose_channel_name(&sb.config.voice_prefix, title)?;

        if let Some(owned) = sb.registry.find_by_owner(author) {
            debug!(channel = %owned.channel_id, "Author already owns a channel");
            return Err(HandlerError::NotEligible);
        }
        let reservation = sb.registry.reserve_owner(ctx.guild, author)?;
        // Unknown presence could hide a seat in a tracked channel.
        let presence = ctx.actor_presence().await.map_err(|e| {
            debug!(error = %e, "Author presence unknown");
            HandlerError::NotEligible
        })?;
        if sb.registry.find_by_member(presence).is_some() {
            return Err(HandlerError::NotEligible);
        }

        let channel = sb
            .gateway
            .create_voice_channel(ctx.guild, &name)
            .await
            .inspect_err(|e| report_failure("create_voice_channel", e))?;

        let lockdown = [
            (Subject::Role(ctx.guild.everyone_role()), Grant::DenyEveryone),
            (Subject::Member(author), Grant::Operator),
        ];
        for (subject, grant) in lockdown {
            if let Err(e) = sb.gateway.set_channel_permission(channel, subject, grant).await {
                report_failure("set_channel_permission", &e);
                // An unlocked channel must not outlive the failed command.
                if let Err(de) = sb.gateway.delete_channel(channel).await {
                    report_failure("delete_channel", &de);
                }
                return Err(e.into());
            }
        }

        let record = VoiceChannelRecord::new(ctx.guild, channel, author, name.clone(), Utc::now());
        reservation.commit(record)?;
        metrics::record_channel_created();
        info!(channel = %channel, owner = %author, name = %name, "Channel created");

        ctx.reply(&format!("Created a new voice channel! Name: `{name}`"))
            .await;
        Ok(())
    }
}
