//! Private channel commands.

mod common;
mod delete;
mod invite;
mod kick;
mod leave;
mod new;
mod op;

pub use delete::DeleteHandler;
pub use invite::InviteHandler;
pub use kick::KickHandler;
pub use leave::LeaveHandler;
pub use new::NewHandler;
pub use op::{DeopHandler, OpHandler};
