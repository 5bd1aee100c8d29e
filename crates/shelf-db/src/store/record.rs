//! # Record Store
//!
//! Database operations for inventory records.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Record Search Works                              │
//! │                                                                         │
//! │  User types: "  ÉMILE "                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SearchQuery::new → needle "émile"  (blank? → list_all)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  list_all() → SearchQuery::filter                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Same rows the live inventory list shows, same id order                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Matching runs in memory because SQLite's `lower()` only folds ASCII.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::change::{ChangeTracker, Table};
use crate::error::StoreResult;
use shelf_core::{Record, SearchQuery};

const RECORD_COLUMNS: &str =
    "id, name, category, quantity, price_cents, language, author, description";

/// Store for inventory records.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.records();
///
/// let saved = store.insert(&Record::new("Dune", "Fiction", 5, price)).await?;
/// let found = store.get_by_id(saved.id).await?;
/// let fiction = store.search("fic").await?;
/// ```
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
    changes: ChangeTracker,
}

impl RecordStore {
    /// Creates a new RecordStore.
    pub fn new(pool: SqlitePool, changes: ChangeTracker) -> Self {
        RecordStore { pool, changes }
    }

    /// Inserts a record.
    ///
    /// ## Arguments
    /// * `record` - Record to insert. `id == 0` lets the store assign one;
    ///   any other id is inserted as-is.
    ///
    /// ## Returns
    /// * `Ok(Record)` - The stored record, carrying its id
    /// * `Err(StoreError::UniqueViolation)` - Explicit id already taken
    /// * `Err(StoreError::CheckViolation)` - Blank name/category, negative numbers
    pub async fn insert(&self, record: &Record) -> StoreResult<Record> {
        debug!(name = %record.name, id = record.id, "Inserting record");

        let result = if record.is_new() {
            sqlx::query(
                r#"
                INSERT INTO records (
                    name, category, quantity, price_cents,
                    language, author, description
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&record.name)
            .bind(&record.category)
            .bind(record.quantity)
            .bind(record.price_cents)
            .bind(&record.language)
            .bind(&record.author)
            .bind(&record.description)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                INSERT INTO records (
                    id, name, category, quantity, price_cents,
                    language, author, description
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.category)
            .bind(record.quantity)
            .bind(record.price_cents)
            .bind(&record.language)
            .bind(&record.author)
            .bind(&record.description)
            .execute(&self.pool)
            .await?
        };

        let mut stored = record.clone();
        stored.id = result.last_insert_rowid();

        self.changes.notify(Table::Records);
        debug!(id = stored.id, "Record inserted");
        Ok(stored)
    }

    /// Gets a record by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Record))` - Record found
    /// * `Ok(None)` - No record with that id
    pub async fn get_by_id(&self, id: i64) -> StoreResult<Option<Record>> {
        let record = sqlx::query_as::<_, Record>(&format!(
            "SELECT {} FROM records WHERE id = ?1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists every record in insertion (id) order.
    pub async fn list_all(&self) -> StoreResult<Vec<Record>> {
        let records = sqlx::query_as::<_, Record>(&format!(
            "SELECT {} FROM records ORDER BY id",
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Lists records whose name or category contains `text`, ignoring case.
    ///
    /// Blank text lists everything.
    pub async fn search(&self, text: &str) -> StoreResult<Vec<Record>> {
        let query = SearchQuery::new(text);
        let records = self.list_all().await?;
        if query.is_blank() {
            return Ok(records);
        }

        debug!(needle = %query.needle(), "Searching records");
        let records = query.filter(records);

        debug!(count = records.len(), "Search returned records");
        Ok(records)
    }

    /// Replaces every field of the record with the given id.
    ///
    /// ## Returns
    /// * `Ok(rows)` - Rows changed; `0` when no record has that id
    pub async fn update(&self, record: &Record) -> StoreResult<u64> {
        debug!(id = record.id, "Updating record");

        let result = sqlx::query(
            r#"
            UPDATE records SET
                name = ?2,
                category = ?3,
                quantity = ?4,
                price_cents = ?5,
                language = ?6,
                author = ?7,
                description = ?8
            WHERE id = ?1
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.category)
        .bind(record.quantity)
        .bind(record.price_cents)
        .bind(&record.language)
        .bind(&record.author)
        .bind(&record.description)
        .execute(&self.pool)
        .await?;

        let rows = result.rows_affected();
        if rows == 0 {
            warn!(id = record.id, "Update matched no record");
        } else {
            self.changes.notify(Table::Records);
        }
        Ok(rows)
    }

    /// Deletes the record with the given id.
    ///
    /// ## Returns
    /// * `Ok(rows)` - Rows removed; `0` when no record has that id
    pub async fn delete(&self, id: i64) -> StoreResult<u64> {
        debug!(id, "Deleting record");

        let result = sqlx::query("DELETE FROM records WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let rows = result.rows_affected();
        if rows == 0 {
            warn!(id, "Delete matched no record");
        } else {
            self.changes.notify(Table::Records);
        }
        Ok(rows)
    }

    /// Counts records (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::pool::{Database, DbConfig};
    use crate::change::Table;
    use shelf_core::{Money, Record, SearchQuery};

    async fn test_db() -> Database {
        Database::connect(DbConfig::in_memory()).await.unwrap()
    }

    fn dune() -> Record {
        Record::new("Dune", "Fiction", 5, Money::from_cents(1299)).with_author("Frank Herbert")
    }

    #[tokio::test]
    async fn test_insert_then_get_by_id() {
        let db = test_db().await;
        let store = db.records();

        let stored = store.insert(&dune()).await.unwrap();
        assert_ne!(stored.id, 0);

        let found = store.get_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(Record { id: 0, ..found }, dune());
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let db = test_db().await;
        let store = db.records();

        let first = store.insert(&dune()).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.insert(&dune()).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_explicit_id_conflict_is_unique_violation() {
        let db = test_db().await;
        let store = db.records();

        let stored = store.insert(&dune()).await.unwrap();
        let clash = stored.clone().with_quantity(42);
        let err = store.insert(&clash).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));

        // The existing row is kept, not replaced.
        assert_eq!(store.get_by_id(stored.id).await.unwrap(), Some(stored));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_check_constraints() {
        let db = test_db().await;
        let store = db.records();

        let err = store.insert(&dune().with_quantity(-1)).await.unwrap_err();
        assert!(matches!(err, StoreError::CheckViolation { .. }));
        assert!(err.is_constraint_violation());

        let blank = Record::new("  ", "Fiction", 1, Money::zero());
        assert!(store.insert(&blank).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let db = test_db().await;
        assert!(db.records().get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_report_rows() {
        let db = test_db().await;
        let store = db.records();

        let stored = store.insert(&dune()).await.unwrap();
        let emptied = stored.clone().with_quantity(0);
        assert_eq!(store.update(&emptied).await.unwrap(), 1);
        assert_eq!(store.get_by_id(stored.id).await.unwrap().unwrap().quantity, 0);

        let ghost = Record { id: 4242, ..dune() };
        assert_eq!(store.update(&ghost).await.unwrap(), 0);
        assert_eq!(store.delete(4242).await.unwrap(), 0);

        assert_eq!(store.delete(stored.id).await.unwrap(), 1);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_effective_writes_are_announced() {
        let db = test_db().await;
        let store = db.records();
        let mut changes = db.changes().subscribe();

        store.delete(7).await.unwrap();
        let stored = store.insert(&dune()).await.unwrap();
        store.delete(stored.id).await.unwrap();

        assert_eq!(changes.recv().await.unwrap(), Table::Records);
        assert_eq!(changes.recv().await.unwrap(), Table::Records);
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_search_agrees_with_in_memory_predicate() {
        let db = test_db().await;
        let store = db.records();

        for (name, category) in [
            ("Dune", "Fiction"),
            ("Cosmos", "Science"),
            ("Dune Messiah", "Fiction"),
            ("Fichte Reader", "Philosophy"),
            ("100% Pure", "Cooking"),
            ("Émile Zola", "Littérature"),
            ("Straße", "Atlas"),
        ] {
            store
                .insert(&Record::new(name, category, 1, Money::from_cents(100)))
                .await
                .unwrap();
        }
        let all = store.list_all().await.unwrap();

        for text in [
            "", "  ", "dune", "FIC", " sci", "%", "_", "zzz", "e", "émile", "ÉMILE", "LITTÉR",
            "STRASSE", "straße",
        ] {
            let from_store = store.search(text).await.unwrap();
            let in_memory = SearchQuery::new(text).filter(all.clone());
            assert_eq!(from_store, in_memory, "query {:?}", text);
        }

        let zola = store.search("émile").await.unwrap();
        assert_eq!(zola.len(), 1);
        assert_eq!(zola[0].name, "Émile Zola");
        assert_eq!(store.search("ÉMILE").await.unwrap(), zola);
    }
}
