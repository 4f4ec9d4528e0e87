//! `delete` - destroy the author's channel.

use crate::error::HandlerResult;
use crate::handlers::{Context, Handler};
use crate::state::DeleteReason;
use async_trait::async_trait;

pub struct DeleteHandler;

#[async_trait]
impl Handler for DeleteHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let record = ctx.authorized_channel().await?;

        let destroyed = ctx
            .switchboard
            .destroy_channel(record.channel_id, DeleteReason::Command)
            .await?;
        if let Some(record) = destroyed {
            ctx.reply(&format!("Deleted channel: `{}`", record.display_name))
                .await;
        }
        Ok(())
    }
}
