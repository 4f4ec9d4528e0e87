//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: The on-disk settings structs and the runtime [`BotConfig`]
//! - [`defaults`]: serde default values
//! - [`validation`]: startup checks that turn settings into a [`BotConfig`]
//! - [`template`]: the first-run settings template

mod defaults;
mod template;
mod types;
mod validation;

pub use template::write_template;
pub use types::{BotConfig, Config, ConfigError};
pub use validation::validate;
