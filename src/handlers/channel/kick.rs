//! `kick` - revoke a user's access to a channel.

use super::common::grant_each;
use crate::error::HandlerResult;
use crate::gateway::report_failure;
use crate::handlers::{Context, Handler};
use async_trait::async_trait;
use pvoice_proto::Grant;
use tracing::info;

/// Handler for `kick @user...`.
///
/// Kicked users lose operator status before their grant is revoked, so a
/// failed permission call never leaves them with operator rights. Anyone
/// kicked while inside the channel is disconnected from voice.
pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let sb = ctx.switchboard;
        let record = ctx.authorized_channel().await?;

        let targets: Vec<_> = ctx
            .mentions()
            .iter()
            .copied()
            .filter(|u| *u != record.owner_id)
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        sb.registry.remove_operators(record.channel_id, &targets)?;
        let revoked = grant_each(ctx, record.channel_id, &targets, Grant::Revoked).await?;

        for &user in &revoked {
            let presence = match sb.gateway.voice_presence(user, ctx.guild).await {
                Ok(presence) => presence,
                Err(e) => {
                    report_failure("voice_presence", &e);
                    continue;
                }
            };
            if presence == Some(record.channel_id) {
                if let Err(e) = sb.gateway.disconnect_member(ctx.guild, user).await {
                    report_failure("disconnect_member", &e);
                }
            }
        }
        if revoked.is_empty() {
            return Ok(());
        }
        info!(channel = %record.channel_id, kicked = ?revoked, "Users kicked");

        ctx.reply(&format!(
            "They can no longer join/speak in your channel, `{}`",
            record.display_name
        ))
        .await;
        Ok(())
    }
}
