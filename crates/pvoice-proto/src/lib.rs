//! # pvoice-proto
//!
//! The wire-level vocabulary shared by the pvoiced daemon: platform
//! identifiers, the chat command grammar, permission grants and the
//! channel naming rules.
//!
//! Nothing in here talks to the network. The daemon converts platform
//! events into these types and back.
//!
//! ## Quick Start
//!
//! ```rust
//! use pvoice_proto::{parse_command, CommandKind};
//!
//! let cmd = parse_command('!', "!new Game Night").expect("valid command");
//! assert_eq!(cmd.kind, CommandKind::New);
//! assert_eq!(cmd.rest, "Game Night");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod grant;
pub mod id;
pub mod name;

pub use self::command::{parse_command, CommandKind, CommandRef};
pub use self::error::{ProtocolError, Result};
pub use self::grant::Grant;
pub use self::id::{ChannelId, GuildId, RoleId, UserId};
pub use self::name::{compose_channel_name, has_voice_prefix, MAX_CHANNEL_NAME_LEN};
