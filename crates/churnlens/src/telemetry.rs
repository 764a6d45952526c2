//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// `RUST_LOG` when set, otherwise the configured directives.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: config.filter.clone(),
        reason: e.to_string(),
    })
}

/// Installs the global subscriber and bridges `log` records into it.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let registry = Registry::default().with(filter);

    let result = if config.json {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_current_span(true).with_target(true)),
        )
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(false)))
    };
    result.map_err(|e| TelemetryError::Install(e.to_string()))?;

    tracing_log::LogTracer::init().map_err(|e| TelemetryError::Install(e.to_string()))?;

    tracing::debug!(json = config.json, "Tracing initialized");
    Ok(())
}
