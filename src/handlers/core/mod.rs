//! Core handler infrastructure.
//!
//! The handler context, the [`Handler`] trait and the [`Dispatcher`] that
//! routes parsed chat commands to handlers.

pub mod context;
pub mod dispatcher;

pub use context::{Author, Context, Handler, IncomingMessage};
pub use dispatcher::Dispatcher;
