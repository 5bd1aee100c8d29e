//! # App Configuration
//!
//! Configuration management for ShelfStock.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHELFSTOCK_DB_PATH=/tmp/shelf.db                                   │
//! │     SHELFSTOCK_DEBOUNCE_MS=150                                         │
//! │     SHELFSTOCK_GRACE_MS=5000                                           │
//! │     SHELFSTOCK_LOG_LEVEL=debug                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shelfstock/shelfstock.toml (Linux)                       │
//! │     ~/Library/Application Support/com.shelfstock.shelfstock/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     debounce 300 ms, grace period 5 s, data-dir database               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # shelfstock.toml
//! [database]
//! path = "/var/lib/shelfstock/shelfstock.db"   # ":memory:" for a throwaway store
//! max_connections = 5
//! connect_timeout_secs = 30
//!
//! [live]
//! debounce_ms = 300
//! grace_period_ms = 5000
//!
//! [logging]
//! level = "info,shelf=debug"
//! json = false
//! ```

use serde::{Deserialize, Serialize};
use shelf_db::DbConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

/// Longest accepted search debounce.
const MAX_DEBOUNCE_MS: u64 = 10_000;

// =============================================================================
// Database Settings
// =============================================================================

/// Where and how to open the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. `None` means `<data dir>/shelfstock.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long to wait for a pooled connection (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Live View Settings
// =============================================================================

/// Timing of live views.
///
/// ```text
///  search text ──(debounce_ms of quiet)──► filtered list
///  last observer leaves ──(grace_period_ms)──► store subscription dropped
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSettings {
    /// Quiet time before a search text change is applied.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// How long a shared view keeps its store subscription with no observers.
    #[serde(default = "default_grace_period")]
    pub grace_period_ms: u64,
}

fn default_debounce() -> u64 {
    300
}

fn default_grace_period() -> u64 {
    5_000
}

impl Default for LiveSettings {
    fn default() -> Self {
        LiveSettings {
            debounce_ms: default_debounce(),
            grace_period_ms: default_grace_period(),
        }
    }
}

impl LiveSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

/// Log output settings. `RUST_LOG`, when set, wins over `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info,shelf=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
            json: false,
        }
    }
}

// =============================================================================
// Main App Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub live: LiveSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with a throwaway in-memory database and the given timings.
    /// Meant for tests and demos.
    pub fn in_memory(debounce_ms: u64, grace_period_ms: u64) -> Self {
        AppConfig {
            database: DatabaseSettings {
                path: Some(PathBuf::from(":memory:")),
                ..DatabaseSettings::default()
            },
            live: LiveSettings {
                debounce_ms,
                grace_period_ms,
            },
            logging: LoggingSettings::default(),
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shelfstock.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.database.max_connections == 0 {
            return Err(SyncError::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.live.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(SyncError::InvalidConfig(format!(
                "live.debounce_ms must be at most {}, got {}",
                MAX_DEBOUNCE_MS, self.live.debounce_ms
            )));
        }

        if self.logging.level.trim().is_empty() {
            return Err(SyncError::InvalidConfig("logging.level must not be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable numbers are ignored
    /// with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("SHELFSTOCK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("SHELFSTOCK_DEBOUNCE_MS") {
            match value.parse::<u64>() {
                Ok(ms) => self.live.debounce_ms = ms,
                Err(_) => warn!(value = %value, "Ignoring invalid SHELFSTOCK_DEBOUNCE_MS"),
            }
        }

        if let Some(value) = lookup("SHELFSTOCK_GRACE_MS") {
            match value.parse::<u64>() {
                Ok(ms) => self.live.grace_period_ms = ms,
                Err(_) => warn!(value = %value, "Ignoring invalid SHELFSTOCK_GRACE_MS"),
            }
        }

        if let Some(level) = lookup("SHELFSTOCK_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("shelfstock.toml"))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "shelfstock", "shelfstock")
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolves the database file, falling back to the platform data dir.
    pub fn database_path(&self) -> SyncResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs().ok_or_else(|| {
            SyncError::InvalidConfig("Could not determine app data directory".into())
        })?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("shelfstock.db"))
    }

    /// Builds the store configuration.
    pub fn db_config(&self) -> SyncResult<DbConfig> {
        let path = self.database_path()?;
        let config = if path == std::path::Path::new(":memory:") {
            DbConfig::in_memory()
        } else {
            DbConfig::new(path)
                .max_connections(self.database.max_connections)
                .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.live.debounce(), Duration::from_millis(300));
        assert_eq!(config.live.grace_period(), Duration::from_secs(5));
        assert_eq!(config.database.max_connections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 1;
        config.live.debounce_ms = MAX_DEBOUNCE_MS + 1;
        assert!(config.validate().unwrap_err().is_config_error());

        config.live.debounce_ms = 0;
        config.logging.level = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SHELFSTOCK_DB_PATH", "/tmp/override.db"),
            ("SHELFSTOCK_DEBOUNCE_MS", "150"),
            ("SHELFSTOCK_GRACE_MS", "not-a-number"),
            ("SHELFSTOCK_LOG_LEVEL", "warn"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/override.db")));
        assert_eq!(config.live.debounce_ms, 150);
        assert_eq!(config.live.grace_period_ms, 5_000);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str("[live]\ndebounce_ms = 50\n").unwrap();
        assert_eq!(config.live.debounce_ms, 50);
        assert_eq!(config.live.grace_period_ms, 5_000);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shelfstock.toml");

        let mut config = AppConfig::in_memory(120, 800);
        config.logging.json = true;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[database]"));
        assert!(contents.contains("[live]"));

        let loaded: AppConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_memory_path_builds_in_memory_db_config() {
        let config = AppConfig::in_memory(20, 100);
        assert!(config.db_config().unwrap().is_in_memory());

        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from("/tmp/shelf.db"));
        config.database.max_connections = 3;
        let db = config.db_config().unwrap();
        assert!(!db.is_in_memory());
        assert_eq!(db.max_connections, 3);
    }
}
