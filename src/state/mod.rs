//! State management module.
//!
//! Contains the channel registry, the per-channel record, the permission
//! model, and the Switchboard that ties them to the gateway.

mod permissions;
mod record;
mod registry;
mod switchboard;

pub use permissions::is_authorized;
pub use record::VoiceChannelRecord;
pub use registry::ChannelRegistry;
pub use switchboard::{DeleteReason, Switchboard};
