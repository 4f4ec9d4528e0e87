//! Chat command grammar.
//!
//! A command line is `<prefix><name>[ <rest>]`, where `<prefix>` is a single
//! configured character and `<name>` is matched case-insensitively.

mod parse;
mod types;

pub use self::parse::parse_command;
pub use self::types::{CommandKind, CommandRef};
