//! # Telemetry
//!
//! Structured logging through `tracing`.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - everything at debug
//! - `RUST_LOG=lunch_engine=trace` - trace for the engine only
//! - without `RUST_LOG`, the configured filter (`LUNCH_LOG` / `[logging]`)

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,lunch=debug,sqlx=warn";

/// Installs the global subscriber.
///
/// Returns false if one was already installed (tests, embedding hosts).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
