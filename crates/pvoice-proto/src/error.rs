//! Error types for the protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Protocol-level errors.
///
/// Most of these mean "this chat message is not for us"; the daemon
/// treats them as a silent ignore rather than a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The message has no text (attachments only, embeds, ...).
    #[error("empty message")]
    Empty,

    /// The message does not start with the command prefix.
    #[error("missing command prefix {0:?}")]
    MissingPrefix(char),

    /// The prefix is followed by whitespace or nothing.
    #[error("missing command name")]
    MissingCommand,

    /// The first token is not a recognized command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A snowflake identifier could not be parsed.
    #[error("invalid snowflake: {0:?}")]
    InvalidSnowflake(String),

    /// A composed channel name exceeds the platform limit.
    #[error("channel name too long: {len} characters (limit: {limit})")]
    NameTooLong {
        /// Actual length in characters.
        len: usize,
        /// Maximum allowed length.
        limit: usize,
    },
}
