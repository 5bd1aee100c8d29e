//! # Database Schema
//!
//! Creates the two tables and replaces them when the stored schema version
//! does not match this build.
//!
//! ## How Schema Setup Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Schema Setup                                       │
//! │                                                                         │
//! │  Database::connect                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PRAGMA user_version                                                   │
//! │       │                                                                 │
//! │       ├── == SCHEMA_VERSION ──► CREATE TABLE IF NOT EXISTS (no-op)      │
//! │       │                                                                 │
//! │       └── != SCHEMA_VERSION ──► DROP every known table                  │
//! │                                  CREATE tables + indexes                │
//! │                                  PRAGMA user_version = SCHEMA_VERSION   │
//! │                                                                         │
//! │  All in one transaction.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no data migration: a version change wipes every row. Bump
//! [`SCHEMA_VERSION`] whenever a statement below changes.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};

/// Version written to `PRAGMA user_version` after a successful setup.
pub const SCHEMA_VERSION: i64 = 3;

/// Tables owned by this schema, dropped on a version mismatch.
pub const KNOWN_TABLES: &[&str] = &["records", "notifications"];

const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS records (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT    NOT NULL CHECK (length(trim(name)) > 0),
        category    TEXT    NOT NULL CHECK (length(trim(category)) > 0),
        quantity    INTEGER NOT NULL CHECK (quantity >= 0),
        price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
        language    TEXT    NOT NULL DEFAULT 'Not Provided',
        author      TEXT    NOT NULL DEFAULT 'Not Provided',
        description TEXT    NOT NULL DEFAULT 'Not Provided'
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_records_name ON records (name)",
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        title      TEXT    NOT NULL,
        message    TEXT    NOT NULL,
        kind       TEXT    NOT NULL CHECK (kind IN ('ADDED', 'UPDATED', 'DELETED')),
        created_at INTEGER NOT NULL,
        is_read    INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_notifications_recent ON notifications (created_at DESC, id DESC)",
    "CREATE INDEX IF NOT EXISTS idx_notifications_unread ON notifications (is_read)",
];

/// Reads the schema version stored in the database file.
pub async fn schema_version(pool: &SqlitePool) -> StoreResult<i64> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

/// Brings the schema up to [`SCHEMA_VERSION`].
///
/// ## Returns
/// * `Ok(true)` - Tables were (re)created; any previous rows are gone
/// * `Ok(false)` - Schema was already current
pub async fn apply_schema(pool: &SqlitePool) -> StoreResult<bool> {
    let found = schema_version(pool).await?;
    let mut tx = pool.begin().await?;

    let recreated = found != SCHEMA_VERSION;
    if recreated {
        if found != 0 {
            warn!(
                found,
                expected = SCHEMA_VERSION,
                "Schema version mismatch, dropping all tables"
            );
        }
        for table in KNOWN_TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::SchemaFailed(e.to_string()))?;
        }
    }

    for statement in CREATE_STATEMENTS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::SchemaFailed(e.to_string()))?;
    }

    if recreated {
        // PRAGMA does not accept bound parameters.
        sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::SchemaFailed(e.to_string()))?;
    }

    tx.commit().await?;

    if recreated {
        info!(version = SCHEMA_VERSION, "Schema created");
    }
    Ok(recreated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shelf_core::{Money, Record};

    #[tokio::test]
    async fn test_fresh_database_gets_current_version() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        assert_eq!(schema_version(db.pool()).await.unwrap(), SCHEMA_VERSION);

        // Second run is a no-op.
        assert!(!apply_schema(db.pool()).await.unwrap());
    }

    #[tokio::test]
    async fn test_version_mismatch_wipes_tables() {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        db.records()
            .insert(&Record::new("Dune", "Fiction", 5, Money::from_cents(1299)))
            .await
            .unwrap();
        assert_eq!(db.records().count().await.unwrap(), 1);

        sqlx::query("PRAGMA user_version = 2")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(apply_schema(db.pool()).await.unwrap());
        assert_eq!(schema_version(db.pool()).await.unwrap(), SCHEMA_VERSION);
        assert_eq!(db.records().count().await.unwrap(), 0);
        assert!(db.notifications().list_all().await.unwrap().is_empty());
    }
}
