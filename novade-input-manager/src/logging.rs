// novade-input-manager/src/logging.rs

//! Logging setup for binaries and tests embedding the input manager.
//!
//! The crate itself only emits `tracing` events; installing a subscriber is
//! left to the application. These helpers install a `tracing-subscriber` fmt
//! subscriber for the common cases.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Installs a stderr subscriber filtered by `config.level`.
///
/// `RUST_LOG`, when set, takes precedence over the configured level. An
/// unparsable level falls back to `info` with a warning.
///
/// Returns `false` if a global subscriber was already installed, which is
/// the case when the configuration is reloaded.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let (filter, invalid) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, false),
        Err(_) => match EnvFilter::try_new(&config.level) {
            Ok(filter) => (filter, false),
            Err(_) => (EnvFilter::new(Level::INFO.to_string()), true),
        },
    };

    let installed = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();

    if invalid {
        tracing::warn!("Logging: invalid log level '{}', using 'info'", config.level);
    }
    if !installed {
        tracing::debug!("Logging: subscriber already installed, keeping it");
    }
    installed
}
