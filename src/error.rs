//! Unified error handling for pvoiced.
//!
//! This module provides the error hierarchy for the daemon, with automatic
//! conversions, chat reply generation, and metric labeling.

use pvoice_proto::{ChannelId, UserId};
use thiserror::Error;

// ============================================================================
// Gateway Errors (platform I/O)
// ============================================================================

/// Failures talking to the chat platform.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The entity is already gone on the platform.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("http error: {0}")]
    Http(String),

    /// The cache lacks the data and it cannot be fetched directly.
    #[error("unavailable: {0}")]
    Unavailable(&'static str),
}

impl GatewayError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Http(_) => "http",
            Self::Unavailable(_) => "unavailable",
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// ============================================================================
// Registry Errors (channel bookkeeping)
// ============================================================================

/// Registry mutations that would break an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("user {0} already owns or is creating a channel")]
    OwnerTaken(UserId),

    #[error("channel {0} is already tracked")]
    ChannelTaken(ChannelId),

    #[error("channel {0} is not tracked")]
    UnknownChannel(ChannelId),
}

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Author owns a channel or is sitting in one.
    #[error("not eligible to create a channel")]
    NotEligible,

    #[error("channel name too long: {len} > {limit}")]
    NameTooLong { len: usize, limit: usize },

    #[error("no users mentioned")]
    NoMentions,

    #[error("not in a private channel")]
    NotInPrivateChannel,

    #[error("not authorized on channel {0}")]
    NotAuthorized(ChannelId),

    #[error("not an operator on channel {0}")]
    NotOperator(ChannelId),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotEligible => "not_eligible",
            Self::NameTooLong { .. } => "name_too_long",
            Self::NoMentions => "no_mentions",
            Self::NotInPrivateChannel => "not_in_private_channel",
            Self::NotAuthorized(_) => "not_authorized",
            Self::NotOperator(_) => "not_operator",
            Self::Gateway(_) => "gateway_error",
            Self::Registry(RegistryError::OwnerTaken(_)) => "not_eligible",
            Self::Registry(_) => "registry_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Convert to a chat reply addressed to `author`.
    ///
    /// Returns `None` for errors that stay silent (authorization failures,
    /// missing mentions, platform errors).
    pub fn user_reply(&self, author: UserId) -> Option<String> {
        match self {
            Self::NotEligible | Self::Registry(RegistryError::OwnerTaken(_)) => Some(format!(
                "{}, you either already own a channel or are in a private voice channel!",
                author.mention()
            )),
            Self::NameTooLong { .. } => Some(format!("{}, that does not fit!", author.mention())),

            Self::NoMentions => None,
            Self::NotInPrivateChannel => None,
            Self::NotAuthorized(_) => None,
            Self::NotOperator(_) => None,
            Self::Gateway(_) => None,
            Self::Registry(_) => None,
            Self::Internal(_) => None,
        }
    }

    /// Whether this is an expected refusal rather than a fault worth a warning.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::NotEligible
                | Self::NameTooLong { .. }
                | Self::NoMentions
                | Self::NotInPrivateChannel
                | Self::NotAuthorized(_)
                | Self::NotOperator(_)
                | Self::Registry(RegistryError::OwnerTaken(_))
        )
    }
}

impl From<pvoice_proto::ProtocolError> for HandlerError {
    fn from(err: pvoice_proto::ProtocolError) -> Self {
        match err {
            pvoice_proto::ProtocolError::NameTooLong { len, limit } => {
                Self::NameTooLong { len, limit }
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
