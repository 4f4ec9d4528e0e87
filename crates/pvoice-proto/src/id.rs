//! Platform identifiers.
//!
//! Discord identifies everything with 64-bit snowflakes. Each entity kind
//! gets its own newtype so a user id can never be passed where a channel
//! id is expected.

use crate::error::ProtocolError;
use std::fmt;
use std::str::FromStr;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw snowflake.
            #[inline]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw snowflake value.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ProtocolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>()
                    .map(Self)
                    .map_err(|_| ProtocolError::InvalidSnowflake(s.to_owned()))
            }
        }
    };
}

snowflake!(
    /// A guild (server).
    GuildId
);
snowflake!(
    /// A text or voice channel.
    ChannelId
);
snowflake!(
    /// A user account.
    UserId
);
snowflake!(
    /// A guild role.
    RoleId
);

impl GuildId {
    /// The implicit `@everyone` role, which shares the guild's snowflake.
    #[inline]
    pub const fn everyone_role(self) -> RoleId {
        RoleId(self.0)
    }
}

impl UserId {
    /// Chat markup that pings this user.
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}
