//! Configuration module for named-object registries
//!
//! Provides types and loading for the optional `named-objects.toml` file.

pub mod loader;
pub mod schema;

pub use loader::{find_config, find_config_from, load_config, ConfigError, CONFIG_FILE_NAME};
pub use schema::*;
