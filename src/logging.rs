//! Tracing subscriber installation for the binary.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Raised when a global subscriber is already installed.
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(String);

/// Installs a human-readable subscriber writing to stderr, filtered by
/// `RUST_LOG`. Stdout stays reserved for the copy result.
///
/// # Errors
///
/// Returns [`LoggingError`] when another global subscriber is already set.
pub fn init_logging() -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(build_env_filter(DEFAULT_LOG_LEVEL))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|err| LoggingError(err.to_string()))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
