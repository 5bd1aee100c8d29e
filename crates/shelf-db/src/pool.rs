//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Handle                                    │
//! │                                                                         │
//! │  ShelfApp::start (composition root)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect(config).await ← Create pool + apply schema          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────┐   ┌──────────────────────┐           │
//! │  │         SqlitePool          │   │    ChangeTracker     │           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐   │   │  broadcast<Table>    │           │
//! │  │  │Conn1│ │Conn2│ │Conn3│   │   └──────────┬───────────┘           │
//! │  │  └─────┘ └─────┘ └─────┘   │              │                       │
//! │  └──────────────┬──────────────┘              │                       │
//! │                 │                              │                       │
//! │                 ▼                              ▼                       │
//! │        db.records() / db.notifications()  (share both)                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases run in WAL mode so live-view re-reads don't block writers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::change::{ChangeTracker, Table};
use crate::error::{StoreError, StoreResult};
use crate::schema;
use crate::store::notification::NotificationStore;
use crate::store::record::RecordStore;

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use shelf_db::DbConfig;
///
/// let config = DbConfig::new("/path/to/shelfstock.db")
///     .max_connections(5)
///     .min_connections(1);
/// assert_eq!(config.max_connections, 5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to create / replace the schema on connect.
    /// Default: true
    pub apply_schema: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            apply_schema: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to apply the schema on connect.
    pub fn apply_schema(mut self, apply: bool) -> Self {
        self.apply_schema = apply;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Every call yields a separate, empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            apply_schema: true,
        }
    }

    /// True for the `:memory:` configuration.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing store access.
///
/// Cheap to clone: clones share the pool and the change tracker. It is built
/// once at the composition root and handed to whatever needs it; there is no
/// global instance.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Table change announcements shared by every store.
    changes: ChangeTracker,
}

impl Database {
    /// Opens the database and prepares the schema.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite (WAL, NORMAL synchronous) for file databases
    /// 3. Creates the connection pool
    /// 4. Applies the schema (if enabled); a version mismatch wipes all tables
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(StoreError)` - Connection or schema setup failed
    pub async fn connect(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let in_memory = config.is_in_memory();

        let connect_options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true)
        };

        debug!(in_memory, "Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);

        // Closing the only connection would discard an in-memory database.
        pool_options = if in_memory {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            changes: ChangeTracker::new(),
        };

        if config.apply_schema {
            db.apply_schema().await?;
        }

        Ok(db)
    }

    /// Applies the schema.
    ///
    /// ## Returns
    /// * `Ok(true)` - Tables were (re)created
    /// * `Ok(false)` - Schema was already current
    pub async fn apply_schema(&self) -> StoreResult<bool> {
        let recreated = schema::apply_schema(&self.pool).await?;
        if recreated {
            // Any live view holding old rows must re-read.
            self.changes.notify(Table::Records);
            self.changes.notify(Table::Notifications);
        }
        Ok(recreated)
    }

    /// Returns a reference to the connection pool.
    ///
    /// For diagnostics and fault injection. Prefer the stores.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the change tracker shared by both stores.
    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    /// Returns the record store.
    pub fn records(&self) -> RecordStore {
        RecordStore::new(self.pool.clone(), self.changes.clone())
    }

    /// Returns the notification store.
    pub fn notifications(&self) -> NotificationStore {
        NotificationStore::new(self.pool.clone(), self.changes.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all store operations fail with
    /// `StoreError::ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::connect(DbConfig::in_memory()).await.unwrap();
        let b = Database::connect(DbConfig::in_memory()).await.unwrap();

        sqlx::query("DROP TABLE records")
            .execute(a.pool())
            .await
            .unwrap();
        assert!(a.records().count().await.is_err());
        assert_eq!(b.records().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .apply_schema(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.apply_schema);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
