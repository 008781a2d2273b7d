//! Tracing subscriber setup.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    AlreadyInitialized(String),
}

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` overrides the configured level. Calling this twice returns
/// an error instead of panicking, so tests can call it freely.
pub fn init(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| TelemetryError::InvalidFilter(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    tracing::debug!(json = config.json, "Tracing initialized");
    Ok(())
}
