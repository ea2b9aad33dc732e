//! Configuration management for the Zettel bot.
//!
//! Settings are read from YAML, overridden from the environment and then
//! validated before either binary starts.

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::*;
