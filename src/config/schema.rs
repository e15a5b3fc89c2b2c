//! Configuration schema types for `named-objects.toml`
//!
//! Every section and field is optional; missing values take the defaults below.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// `[registry]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Capacity hint for newly created registries
    #[serde(default)]
    pub initial_capacity: usize,
}

/// `[samples]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplesConfig {
    /// Prefix of generated column headers ("Var" gives "Var 1", "Var 2", ...)
    #[serde(default = "default_header_prefix")]
    pub header_prefix: String,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self { header_prefix: default_header_prefix() }
    }
}

fn default_header_prefix() -> String {
    "Var".to_string()
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_filter() }
    }
}

fn default_filter() -> String {
    "warn".to_string()
}

/// Root of `named-objects.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub samples: SamplesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "samples.header_prefix")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "named-objects.toml: '{}' {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.samples.header_prefix.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "samples.header_prefix".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.logging.filter.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "logging.filter".to_string(),
                message: "must be a non-empty filter directive".to_string(),
            });
        } else if let Err(e) = EnvFilter::try_new(&self.logging.filter) {
            errors.push(ConfigValidationError {
                field: "logging.filter".to_string(),
                message: format!("is not a valid filter directive: {}", e),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
