//! Shared helpers for channel command handlers.

use crate::error::HandlerError;
use crate::gateway::{Subject, report_failure};
use crate::handlers::Context;
use pvoice_proto::{ChannelId, Grant, UserId};

/// Apply `grant` to each user on `channel`, returning those that succeeded.
///
/// A failure for one user does not stop the others. Only when every single
/// call fails is the last error returned.
pub async fn grant_each(
    ctx: &Context<'_>,
    channel: ChannelId,
    users: &[UserId],
    grant: Grant,
) -> Result<Vec<UserId>, HandlerError> {
    let mut granted = Vec::with_capacity(users.len());
    let mut last_err = None;

    for &user in users {
        match ctx
            .switchboard
            .gateway
            .set_channel_permission(channel, Subject::Member(user), grant)
            .await
        {
            Ok(()) => granted.push(user),
            Err(e) => {
                report_failure("set_channel_permission", &e);
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if granted.is_empty() => Err(e.into()),
        _ => Ok(granted),
    }
}
