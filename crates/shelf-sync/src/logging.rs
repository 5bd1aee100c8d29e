//! # Logging
//!
//! Installs the global `tracing` subscriber.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages from everything
//! - `RUST_LOG=shelf=trace` - Trace ShelfStock crates only (change events)
//! - Default: `info,shelf=debug,sqlx=warn`

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::{SyncError, SyncResult};

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(settings: &LoggingSettings) -> String {
    format!("{},sqlx=warn", settings.level.trim())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Fails instead of panicking when a subscriber is already installed, so
/// calling it twice (tests, embedding) is harmless.
pub fn init_tracing(settings: &LoggingSettings) -> SyncResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(settings)))
        .map_err(|e| SyncError::LoggingInit(e.to_string()))?;

    let result = if settings.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    result.map_err(|e| SyncError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives(&LoggingSettings::default()),
            "info,shelf=debug,sqlx=warn"
        );
    }

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let settings = LoggingSettings::default();
        let _ = init_tracing(&settings);
        assert!(matches!(
            init_tracing(&settings),
            Err(SyncError::LoggingInit(_))
        ));
    }
}
