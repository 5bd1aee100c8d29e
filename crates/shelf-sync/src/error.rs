//! # Sync Error Types
//!
//! Error types for startup, configuration and logging.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       shelf-sync Error Categories                       │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Store       │  │     Logging             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Store(..)      │  │  LoggingInit            │ │
//! │  │  ConfigLoad..   │  │  (StoreError)   │  │                         │ │
//! │  │  ConfigSave..   │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Coordinator outcomes are not SyncErrors: they are ActionErrors        │
//! │  (coordinator module) and land in the view state's last_error.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shelf_db::StoreError;
use thiserror::Error;

/// Result type alias for shelf-sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while starting, configuring or stopping the app.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    /// Opening the database or preparing its schema failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // =========================================================================
    // Logging Errors
    // =========================================================================
    /// A global tracing subscriber was already installed, or the filter is bad.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}
