//! Permission grants for private voice channels.
//!
//! A grant is the pair of allow/deny bitmasks written as a channel
//! permission overwrite for one subject (a member or a role).

/// Discord permission bits used by private voice channels.
pub mod bits {
    /// Join the voice channel.
    pub const CONNECT: u64 = 1 << 20;
    /// Talk in the voice channel.
    pub const SPEAK: u64 = 1 << 21;
    /// Server-mute other members.
    pub const MUTE_MEMBERS: u64 = 1 << 22;
    /// Server-deafen other members.
    pub const DEAFEN_MEMBERS: u64 = 1 << 23;
    /// Drag members between voice channels.
    pub const MOVE_MEMBERS: u64 = 1 << 24;
    /// Transmit with voice activity instead of push-to-talk.
    pub const USE_VAD: u64 = 1 << 25;

    /// Every voice capability the daemon manages.
    pub const ALL_VOICE: u64 =
        CONNECT | SPEAK | MUTE_MEMBERS | DEAFEN_MEMBERS | MOVE_MEMBERS | USE_VAD;
}

/// A permission overwrite applied to a private channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grant {
    /// Invited member: may connect and speak.
    Member,
    /// Owner or operator: member rights plus muting others.
    Operator,
    /// Kicked: the overwrite is emptied and the role default applies.
    Revoked,
    /// Applied to `@everyone` at creation so the channel starts private.
    DenyEveryone,
}

impl Grant {
    /// Bits explicitly allowed.
    pub const fn allow(self) -> u64 {
        match self {
            Grant::Member => bits::CONNECT | bits::SPEAK | bits::USE_VAD,
            Grant::Operator => bits::CONNECT | bits::SPEAK | bits::MUTE_MEMBERS | bits::USE_VAD,
            Grant::Revoked | Grant::DenyEveryone => 0,
        }
    }

    /// Bits explicitly denied.
    pub const fn deny(self) -> u64 {
        match self {
            Grant::DenyEveryone => bits::ALL_VOICE,
            Grant::Member | Grant::Operator | Grant::Revoked => 0,
        }
    }
}
