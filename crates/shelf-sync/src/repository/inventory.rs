//! # Inventory Repository
//!
//! Record operations for the coordinators. Every call returns a
//! [`StoreResult`]; nothing here panics on a store failure.

use futures_util::stream::BoxStream;

use shelf_core::Record;
use shelf_db::{ChangeTracker, Database, RecordStore, StoreResult, Table};

use super::logged;
use crate::live::live_query;

/// Repository for inventory records.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InventoryRepository::new(&db);
///
/// let saved = repo.insert(&Record::new("Dune", "Fiction", 5, price)).await?;
/// let mut all = repo.all_records();
/// while let Some(snapshot) = all.next().await {
///     render(&snapshot);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    store: RecordStore,
    changes: ChangeTracker,
}

impl InventoryRepository {
    pub fn new(db: &Database) -> Self {
        InventoryRepository {
            store: db.records(),
            changes: db.changes().clone(),
        }
    }

    /// Persists a record.
    ///
    /// ## Returns
    /// * `Ok(Record)` - The stored record; a zero id is replaced by the
    ///   assigned one
    /// * `Err(StoreError)` - The write failed (constraint, I/O)
    pub async fn insert(&self, record: &Record) -> StoreResult<Record> {
        logged("insert record", self.store.insert(record).await)
    }

    /// Replaces a stored record.
    ///
    /// ## Returns
    /// * `Ok(rows)` - `0` when no record has that id
    pub async fn update(&self, record: &Record) -> StoreResult<u64> {
        logged("update record", self.store.update(record).await)
    }

    /// Deletes a record by its id. A missing id is not an error.
    pub async fn delete(&self, record: &Record) -> StoreResult<u64> {
        logged("delete record", self.store.delete(record.id).await)
    }

    /// Fetches one record; `Ok(None)` when absent.
    pub async fn get_by_id(&self, id: i64) -> StoreResult<Option<Record>> {
        logged("get record", self.store.get_by_id(id).await)
    }

    pub async fn count(&self) -> StoreResult<i64> {
        logged("count records", self.store.count().await)
    }

    /// Live list of every record, ordered by id.
    ///
    /// Emits the current snapshot first, then a fresh one after each write
    /// to the records table.
    pub fn all_records(&self) -> BoxStream<'static, Vec<Record>> {
        let store = self.store.clone();
        live_query(&self.changes, Table::Records, move || {
            let store = store.clone();
            async move { store.list_all().await }
        })
    }

    /// Live list of records whose name or category contains `text`.
    pub fn search(&self, text: &str) -> BoxStream<'static, Vec<Record>> {
        let store = self.store.clone();
        let text = text.to_string();
        live_query(&self.changes, Table::Records, move || {
            let store = store.clone();
            let text = text.clone();
            async move { store.search(&text).await }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
