//! Channel registry - the authoritative map of live private channels.
//!
//! Every read and write goes through one `parking_lot::Mutex`, so the
//! dispatcher, the reactor and the sweeper can never interleave on the map.
//! Methods hand out clones and never hold the lock across an `.await`.

use super::VoiceChannelRecord;
use crate::error::RegistryError;
use crate::metrics;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use pvoice_proto::{ChannelId, GuildId, UserId};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Inner {
    channels: HashMap<ChannelId, VoiceChannelRecord>,
    /// Owner index. Mirrors `channels`, one entry per record.
    owners: HashMap<UserId, ChannelId>,
    /// Owners whose channel is being created on the platform right now.
    pending: HashMap<UserId, GuildId>,
}

impl Inner {
    fn owner_busy(&self, owner: UserId) -> bool {
        self.owners.contains_key(&owner) || self.pending.contains_key(&owner)
    }

    fn insert(&mut self, record: VoiceChannelRecord) -> Result<ChannelId, RegistryError> {
        if self.channels.contains_key(&record.channel_id) {
            return Err(RegistryError::ChannelTaken(record.channel_id));
        }
        if self.owners.contains_key(&record.owner_id) {
            return Err(RegistryError::OwnerTaken(record.owner_id));
        }

        let id = record.channel_id;
        self.owners.insert(record.owner_id, id);
        self.channels.insert(id, record);
        metrics::set_active_channels(self.channels.len());
        Ok(id)
    }

    fn remove(&mut self, channel_id: ChannelId) -> Option<VoiceChannelRecord> {
        let record = self.channels.remove(&channel_id)?;
        self.owners.remove(&record.owner_id);
        metrics::set_active_channels(self.channels.len());
        Some(record)
    }
}

/// Live private channels, keyed by channel id.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    inner: Mutex<Inner>,
}

/// Claim on an owner slot while the platform creates their channel.
///
/// Dropping it without [`commit`](Self::commit) frees the slot again.
#[must_use = "dropping a reservation releases the owner slot"]
pub struct OwnerReservation<'a> {
    registry: &'a ChannelRegistry,
    owner: UserId,
}

impl OwnerReservation<'_> {
    /// Turn the reservation into a tracked record.
    pub fn commit(self, record: VoiceChannelRecord) -> Result<ChannelId, RegistryError> {
        debug_assert_eq!(record.owner_id, self.owner);
        let mut inner = self.registry.inner.lock();
        inner.pending.remove(&self.owner);
        inner.insert(record)
    }
}

impl Drop for OwnerReservation<'_> {
    fn drop(&mut self) {
        self.registry.inner.lock().pending.remove(&self.owner);
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `owner` for a channel about to be created in `guild`.
    ///
    /// Fails if they already own a channel or another creation is in flight.
    pub fn reserve_owner(
        &self,
        guild: GuildId,
        owner: UserId,
    ) -> Result<OwnerReservation<'_>, RegistryError> {
        let mut inner = self.inner.lock();
        if inner.owner_busy(owner) {
            return Err(RegistryError::OwnerTaken(owner));
        }
        inner.pending.insert(owner, guild);
        Ok(OwnerReservation {
            registry: self,
            owner,
        })
    }

    /// Track a new record.
    pub fn create(&self, record: VoiceChannelRecord) -> Result<ChannelId, RegistryError> {
        let mut inner = self.inner.lock();
        if inner.pending.contains_key(&record.owner_id) {
            return Err(RegistryError::OwnerTaken(record.owner_id));
        }
        inner.insert(record)
    }

    pub fn get(&self, channel_id: ChannelId) -> Option<VoiceChannelRecord> {
        self.inner.lock().channels.get(&channel_id).cloned()
    }

    pub fn is_tracked(&self, channel_id: ChannelId) -> bool {
        self.inner.lock().channels.contains_key(&channel_id)
    }

    pub fn find_by_owner(&self, owner: UserId) -> Option<VoiceChannelRecord> {
        let inner = self.inner.lock();
        let id = inner.owners.get(&owner)?;
        inner.channels.get(id).cloned()
    }

    /// The tracked channel a user's live voice presence points at.
    pub fn find_by_member(&self, presence: Option<ChannelId>) -> Option<VoiceChannelRecord> {
        presence.and_then(|id| self.get(id))
    }

    /// Grant operator status. Returns `Ok(false)` if nothing changed
    /// (already an operator, or the owner).
    pub fn add_operator(&self, channel_id: ChannelId, user: UserId) -> Result<bool, RegistryError> {
        let mut inner = self.inner.lock();
        let record = inner
            .channels
            .get_mut(&channel_id)
            .ok_or(RegistryError::UnknownChannel(channel_id))?;
        if user == record.owner_id {
            return Ok(false);
        }
        Ok(record.operators.insert(user))
    }

    /// Drop operator status. Returns how many users actually lost it.
    pub fn remove_operators(
        &self,
        channel_id: ChannelId,
        users: &[UserId],
    ) -> Result<usize, RegistryError> {
        let mut inner = self.inner.lock();
        let record = inner
            .channels
            .get_mut(&channel_id)
            .ok_or(RegistryError::UnknownChannel(channel_id))?;
        Ok(users.iter().filter(|u| record.operators.remove(u)).count())
    }

    /// Flag a channel as joined. Returns true on the first transition.
    pub fn mark_occupied(&self, channel_id: ChannelId) -> bool {
        let mut inner = self.inner.lock();
        match inner.channels.get_mut(&channel_id) {
            Some(record) if !record.occupied => {
                record.occupied = true;
                true
            }
            _ => false,
        }
    }

    /// Stop tracking a channel, handing back its record exactly once.
    pub fn delete(&self, channel_id: ChannelId) -> Option<VoiceChannelRecord> {
        self.inner.lock().remove(channel_id)
    }

    /// Remove and return every record that expired unjoined by `now`.
    pub fn drain_expired(&self, now: DateTime<Utc>, delay: TimeDelta) -> Vec<VoiceChannelRecord> {
        let mut inner = self.inner.lock();
        let expired: Vec<ChannelId> = inner
            .channels
            .values()
            .filter(|r| r.is_expired(now, delay))
            .map(|r| r.channel_id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| inner.remove(id))
            .collect()
    }

    /// Re-insert a record whose platform deletion failed.
    pub fn restore(&self, record: VoiceChannelRecord) -> Result<(), RegistryError> {
        self.inner.lock().insert(record).map(|_| ())
    }

    /// Whether a channel creation is in flight in `guild`.
    pub fn has_pending_in(&self, guild: GuildId) -> bool {
        self.inner.lock().pending.values().any(|g| *g == guild)
    }

    /// Copies of every record, oldest first.
    pub fn snapshot(&self) -> Vec<VoiceChannelRecord> {
        let mut records: Vec<_> = self.inner.lock().channels.values().cloned().collect();
        records.sort_by_key(|r| (r.created_at, r.channel_id));
        records
    }

    pub fn len(&self) -> usize {
        self.inner.lock().channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const GUILD: GuildId = GuildId::new(1);

    fn record(channel: u64, owner: u64) -> VoiceChannelRecord {
        VoiceChannelRecord::new(
            GUILD,
            ChannelId::new(channel),
            UserId::new(owner),
            format!("PV: {channel}"),
            Utc::now(),
        )
    }

    #[test]
    fn test_one_channel_per_owner() {
        let registry = ChannelRegistry::new();
        registry.create(record(10, 1)).unwrap();

        assert_eq!(
            registry.create(record(11, 1)),
            Err(RegistryError::OwnerTaken(UserId::new(1)))
        );
        assert_eq!(
            registry.create(record(10, 2)),
            Err(RegistryError::ChannelTaken(ChannelId::new(10)))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_then_delete_round_trip() {
        let registry = ChannelRegistry::new();
        let id = registry.create(record(10, 1)).unwrap();

        let removed = registry.delete(id).unwrap();
        assert_eq!(removed.owner_id, UserId::new(1));
        assert!(registry.delete(id).is_none());
        assert!(registry.get(id).is_none());
        assert!(registry.find_by_owner(UserId::new(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reservation_blocks_second_owner_claim() {
        let registry = ChannelRegistry::new();
        let owner = UserId::new(1);

        let reservation = registry.reserve_owner(GUILD, owner).unwrap();
        assert!(registry.reserve_owner(GUILD, owner).is_err());
        assert!(registry.create(record(11, 1)).is_err());
        assert!(registry.has_pending_in(GUILD));
        assert!(!registry.has_pending_in(GuildId::new(2)));

        reservation.commit(record(10, 1)).unwrap();
        assert!(!registry.has_pending_in(GUILD));
        assert!(registry.reserve_owner(GUILD, owner).is_err());
        assert_eq!(registry.find_by_owner(owner).unwrap().channel_id, ChannelId::new(10));
    }

    #[test]
    fn test_dropped_reservation_releases_owner() {
        let registry = ChannelRegistry::new();
        let owner = UserId::new(1);

        drop(registry.reserve_owner(GUILD, owner).unwrap());
        assert!(!registry.has_pending_in(GUILD));
        assert!(registry.reserve_owner(GUILD, owner).is_ok());
    }

    #[test]
    fn test_snapshot_is_detached_and_ordered() {
        let registry = ChannelRegistry::new();
        let now = Utc::now();
        let mut later = record(10, 1);
        later.created_at = now;
        let mut earlier = record(11, 2);
        earlier.created_at = now - TimeDelta::seconds(5);
        registry.create(later).unwrap();
        registry.create(earlier).unwrap();

        let snapshot = registry.snapshot();
        let ids: Vec<_> = snapshot.iter().map(|r| r.channel_id).collect();
        assert_eq!(ids, vec![ChannelId::new(11), ChannelId::new(10)]);

        registry.delete(ChannelId::new(10));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_operator_set_is_idempotent() {
        let registry = ChannelRegistry::new();
        let id = registry.create(record(10, 1)).unwrap();
        let b = UserId::new(2);

        assert_eq!(registry.add_operator(id, b), Ok(true));
        assert_eq!(registry.add_operator(id, b), Ok(false));
        assert_eq!(registry.get(id).unwrap().operators.len(), 1);

        assert_eq!(registry.remove_operators(id, &[b]), Ok(1));
        assert_eq!(registry.remove_operators(id, &[b]), Ok(0));
        assert!(registry.get(id).unwrap().operators.is_empty());
    }

    #[test]
    fn test_owner_never_becomes_operator() {
        let registry = ChannelRegistry::new();
        let id = registry.create(record(10, 1)).unwrap();

        assert_eq!(registry.add_operator(id, UserId::new(1)), Ok(false));
        assert!(registry.get(id).unwrap().operators.is_empty());
    }

    #[test]
    fn test_mutating_unknown_channel_fails() {
        let registry = ChannelRegistry::new();
        let missing = ChannelId::new(99);
        assert_eq!(
            registry.add_operator(missing, UserId::new(2)),
            Err(RegistryError::UnknownChannel(missing))
        );
        assert!(registry.remove_operators(missing, &[]).is_err());
        assert!(!registry.mark_occupied(missing));
    }

    #[test]
    fn test_occupancy_is_monotonic() {
        let registry = ChannelRegistry::new();
        let id = registry.create(record(10, 1)).unwrap();

        assert!(registry.mark_occupied(id));
        assert!(!registry.mark_occupied(id));
        registry.add_operator(id, UserId::new(2)).unwrap();
        registry.remove_operators(id, &[UserId::new(2)]).unwrap();
        assert!(registry.get(id).unwrap().occupied);
    }

    #[test]
    fn test_drain_expired_boundary() {
        let registry = ChannelRegistry::new();
        let now = Utc::now();
        let delay = TimeDelta::seconds(30);

        let mut stale = record(10, 1);
        stale.created_at = now - delay - TimeDelta::seconds(1);
        let mut fresh = record(11, 2);
        fresh.created_at = now - delay + TimeDelta::seconds(1);
        let mut joined = record(12, 3);
        joined.created_at = now - TimeDelta::hours(1);
        joined.occupied = true;

        registry.create(stale).unwrap();
        registry.create(fresh).unwrap();
        registry.create(joined).unwrap();

        let drained = registry.drain_expired(now, delay);
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].channel_id, ChannelId::new(10));
        assert!(registry.find_by_owner(UserId::new(1)).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_restore_refuses_when_owner_moved_on() {
        let registry = ChannelRegistry::new();
        let id = registry.create(record(10, 1)).unwrap();
        let removed = registry.delete(id).unwrap();

        registry.create(record(11, 1)).unwrap();
        assert_eq!(
            registry.restore(removed.clone()),
            Err(RegistryError::OwnerTaken(UserId::new(1)))
        );

        registry.delete(ChannelId::new(11));
        registry.restore(removed).unwrap();
        assert!(registry.is_tracked(id));
    }

    #[test]
    fn test_find_by_member_follows_presence() {
        let registry = ChannelRegistry::new();
        registry.create(record(10, 1)).unwrap();

        assert!(registry.find_by_member(None).is_none());
        assert!(registry.find_by_member(Some(ChannelId::new(77))).is_none());
        assert_eq!(
            registry.find_by_member(Some(ChannelId::new(10))).unwrap().owner_id,
            UserId::new(1)
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create { channel: u64, owner: u64 },
        Delete { channel: u64 },
        Reserve { owner: u64 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u64..8, 0u64..4).prop_map(|(channel, owner)| Op::Create { channel, owner }),
            (0u64..8).prop_map(|channel| Op::Delete { channel }),
            (0u64..4).prop_map(|owner| Op::Reserve { owner }),
        ]
    }

    proptest! {
        #[test]
        fn prop_owners_stay_unique(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let registry = ChannelRegistry::new();
            let mut held = Vec::new();

            for op in ops {
                match op {
                    Op::Create { channel, owner } => {
                        let _ = registry.create(record(channel, owner));
                    }
                    Op::Delete { channel } => {
                        registry.delete(ChannelId::new(channel));
                    }
                    Op::Reserve { owner } => {
                        if let Ok(r) = registry.reserve_owner(GUILD, UserId::new(owner)) {
                            held.push(r);
                        }
                    }
                }

                let inner = registry.inner.lock();
                let owners: HashSet<UserId> =
                    inner.channels.values().map(|r| r.owner_id).collect();
                prop_assert_eq!(owners.len(), inner.channels.len());
                prop_assert_eq!(inner.owners.len(), inner.channels.len());
                for owner in inner.pending.keys() {
                    prop_assert!(!owners.contains(owner));
                }
            }
            drop(held);
        }
    }
}
