//! Logging setup.
//!
//! The library only emits `tracing` events; applications that want them on
//! stderr call [`init`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Build the event filter: `RUST_LOG` when set and valid, else the config directive.
pub fn filter_for(config: &LoggingConfig) -> EnvFilter {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    resolve_filter(env.as_deref(), config)
}

/// First valid directive of `env`, `config.filter`, then `"warn"`.
fn resolve_filter(env: Option<&str>, config: &LoggingConfig) -> EnvFilter {
    env.and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(&config.filter).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

/// Install a formatting subscriber for the current process.
///
/// Returns `false` if a global subscriber was already installed, which is not
/// treated as an error.
pub fn init(config: &LoggingConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(config))
        .with_target(false)
        .try_init()
        .is_ok()
}
