//! Who may manage a private channel.

use super::VoiceChannelRecord;
use pvoice_proto::UserId;

/// True iff `actor` owns the channel or holds operator status on it.
#[inline]
pub fn is_authorized(record: &VoiceChannelRecord, actor: UserId) -> bool {
    actor == record.owner_id || record.operators.contains(&actor)
}
