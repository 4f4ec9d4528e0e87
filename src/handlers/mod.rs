//! Chat command handlers.
//!
//! Messages arrive from the event bridge as [`IncomingMessage`]s, are parsed
//! and filtered by the [`Dispatcher`], and run by one [`Handler`] per command.
//!
//! # Commands
//!
//! | command | who may run it |
//! |---|---|
//! | `new [title]` | anyone who owns no channel and sits in none |
//! | `invite`/`allow @user...` | anyone sitting in a private channel |
//! | `op`, `deop`, `kick @user...`, `delete` | owner or operator of the channel they sit in |
//! | `leave` | an operator of the channel they sit in |

mod channel;
mod core;


pub use self::core::{Author, Context, Dispatcher, Handler, IncomingMessage};
