//! `op` / `deop` - manage operator status.

use super::common::grant_each;
use crate::error::HandlerResult;
use crate::handlers::{Context, Handler};
use async_trait::async_trait;
use pvoice_proto::Grant;
use tracing::info;

/// Handler for `op @user...`.
///
/// Grants the operator permission set first and records operator status only
/// for users whose grant went through.
pub struct OpHandler;

#[async_trait]
impl Handler for OpHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
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

        let granted = grant_each(ctx, record.channel_id, &targets, Grant::Operator).await?;
        for &user in &granted {
            ctx.switchboard.registry.add_operator(record.channel_id, user)?;
        }
        if granted.is_empty() {
            return Ok(());
        }
        info!(channel = %record.channel_id, ops = ?granted, "Operators added");

        ctx.reply(&format!(
            "They are now OP'd in your channel, `{}`",
            record.display_name
        ))
        .await;
        Ok(())
    }
}

/// Handler for `deop @user...`.
///
/// Only current operators are affected; they fall back to the member grant.
pub struct DeopHandler;

#[async_trait]
impl Handler for DeopHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let record = ctx.authorized_channel().await?;

        let targets: Vec<_> = ctx
            .mentions()
            .iter()
            .copied()
            .filter(|u| record.operators.contains(u))
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        let granted = grant_each(ctx, record.channel_id, &targets, Grant::Member).await?;
        ctx.switchboard
            .registry
            .remove_operators(record.channel_id, &granted)?;
        if granted.is_empty() {
            return Ok(());
        }
        info!(channel = %record.channel_id, ops = ?granted, "Operators removed");

        ctx.reply(&format!(
            "They are now De-OP'd in your channel, `{}`",
            record.display_name
        ))
        .await;
        Ok(())
    }
}
