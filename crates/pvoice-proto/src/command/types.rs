//! Command type definitions.

use crate::error::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// Every command the daemon recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `new [title]` - create a private voice channel.
    New,
    /// `delete` - destroy the channel the actor is in.
    Delete,
    /// `invite @user...` - let users connect and speak.
    Invite,
    /// `allow @user...` - alias of `invite`.
    Allow,
    /// `op @user...` - grant operator rights.
    Op,
    /// `deop @user...` - revoke operator rights.
    Deop,
    /// `kick @user...` - revoke all access.
    Kick,
    /// `leave` - step down from operator.
    Leave,
}

impl CommandKind {
    /// All recognized commands, in help order.
    pub const ALL: [CommandKind; 8] = [
        CommandKind::New,
        CommandKind::Delete,
        CommandKind::Invite,
        CommandKind::Allow,
        CommandKind::Op,
        CommandKind::Deop,
        CommandKind::Kick,
        CommandKind::Leave,
    ];

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            CommandKind::New => "new",
            CommandKind::Delete => "delete",
            CommandKind::Invite => "invite",
            CommandKind::Allow => "allow",
            CommandKind::Op => "op",
            CommandKind::Deop => "deop",
            CommandKind::Kick => "kick",
            CommandKind::Leave => "leave",
        }
    }

    /// Whether the command is meaningless without `@user` mentions.
    pub const fn requires_mentions(self) -> bool {
        matches!(
            self,
            CommandKind::Invite
                | CommandKind::Allow
                | CommandKind::Op
                | CommandKind::Deop
                | CommandKind::Kick
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProtocolError::UnknownCommand(s.to_owned()))
    }
}

/// A parsed command borrowing from the original message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRef<'a> {
    /// Which command this is.
    pub kind: CommandKind,
    /// The command name exactly as typed.
    pub name: &'a str,
    /// Everything after the command name, trimmed. For `new` this is the
    /// channel title; for the others it holds the raw mention markup.
    pub rest: &'a str,
}

impl<'a> CommandRef<'a> {
    /// The requested channel title, if any.
    pub fn title(&self) -> Option<&'a str> {
        (!self.rest.is_empty()).then_some(self.rest)
    }
}
