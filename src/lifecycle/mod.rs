//! Channel lifecycle: reacting to voice presence and sweeping expired channels.

mod reactor;
mod sweeper;

pub use reactor::{Reactor, VoiceStateChange};
pub use sweeper::spawn_sweeper;
