//! `invite` / `allow` - let users into a channel.

use super::common::grant_each;
use crate::error::HandlerResult;
use crate::handlers::{Context, Handler};
use async_trait::async_trait;
use pvoice_proto::Grant;
use tracing::info;

/// Handler for `invite @user...` and its alias `allow`.
///
/// Anyone sitting in a tracked channel may invite. Users who already hold
/// the owner or operator grant are left untouched.
pub struct InviteHandler;

#[async_trait]
impl Handler for InviteHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let record = ctx.occupied_channel().await?;

        let targets: Vec<_> = ctx
            .mentions()
            .iter()
            .copied()
            .filter(|u| *u != record.owner_id && !record.operators.contains(u))
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        let granted = grant_each(ctx, record.channel_id, &targets, Grant::Member).await?;
        if granted.is_empty() {
            return Ok(());
        }
        info!(channel = %record.channel_id, count = granted.len(), "Users invited");

        ctx.reply(&format!(
            "They can now join your channel, `{}`",
            record.display_name
        ))
        .await;
        Ok(())
    }
}
