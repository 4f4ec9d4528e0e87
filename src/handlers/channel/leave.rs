//! `leave` - step down from operator status.

use super::common::grant_each;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler};
use async_trait::async_trait;
use pvoice_proto::Grant;
use tracing::info;

/// Handler for `leave`.
///
/// The author gives up operator status on the channel they are sitting in
/// and keeps the member grant. Owners cannot step down.
pub struct LeaveHandler;

#[async_trait]
impl Handler for LeaveHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let record = ctx.occupied_channel().await?;
        let author = ctx.author();
        if !record.operators.contains(&author) {
            return Err(HandlerError::NotOperator(record.channel_id));
        }

        grant_each(ctx, record.channel_id, &[author], Grant::Member).await?;
        ctx.switchboard
            .registry
            .remove_operators(record.channel_id, &[author])?;
        info!(channel = %record.channel_id, user = %author, "Operator stepped down");

        ctx.reply(&format!(
            "You are no longer an operator in `{}`",
            record.display_name
        ))
        .await;
        Ok(())
    }
}
