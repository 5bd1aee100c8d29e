//! # Inventory Coordinator
//!
//! View state and actions for the record list and the record form.
//!
//! ## Derived Record List
//! ```text
//! set_search_text("dune") ──► search watch ──► debounce(300ms) ──► SearchQuery
//!                                                                      │
//! all_records (SharedLive) ─────────────────────────────► combine_latest
//!                                                                      │
//!                                                     query.filter(snapshot)
//!                                                                      │
//!                                                     live_records (SharedLive)
//! ```
//!
//! The current search text applies immediately when the list starts; later
//! edits wait for the debounce period to pass without another keystroke.
//!
//! ## Side Effects
//! Every successful insert, update or delete appends one notification. That
//! append is best effort: when it fails the record change stays, the failure
//! is logged and `last_error` is not touched.

use futures_util::future;
use futures_util::stream::{self, StreamExt};
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use shelf_core::{Notification, NotificationKind, Record, RecordDraft, SearchQuery};
use shelf_db::StoreError;

use super::{record_failure, run_action, Action, ActionError, ViewState};
use crate::config::LiveSettings;
use crate::live::{combine_latest, debounce, LiveSubscription, SharedLive};
use crate::repository::{InventoryRepository, NotificationRepository};

// =============================================================================
// View State
// =============================================================================

/// What the inventory screens render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryViewState {
    /// Text as typed; the derived list follows it after the debounce period.
    pub search_text: String,
    /// True while any record action is in flight.
    pub is_loading: bool,
    /// Message from the most recent failed action.
    pub last_error: Option<String>,
    /// Record shown in the detail/edit form. A copy, not a live row.
    pub selected: Option<Record>,
}

impl ViewState for InventoryViewState {
    fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}

/// How a record was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// Sent once per successful insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSaved {
    pub record: Record,
    pub kind: SaveKind,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Owns the inventory view state. Cheap to clone; clones share everything.
///
/// ## Usage
/// ```rust,ignore
/// let inventory = app.inventory();
/// let mut saved = inventory.take_saved_events().unwrap();
///
/// inventory.set_search_text("dune");
/// let mut list = inventory.live_records();
///
/// let record = inventory.save_draft(&draft).await?;
/// if let Some(event) = saved.recv().await {
///     close_form(event.record);
/// }
/// ```
#[derive(Clone)]
pub struct InventoryCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    inventory: InventoryRepository,
    notifications: NotificationRepository,
    state: watch::Sender<InventoryViewState>,
    in_flight: AtomicUsize,
    /// Search text feeding the debounce; separate from `state` so loading
    /// flips do not restart the timer.
    search: watch::Sender<String>,
    all_records: SharedLive<Vec<Record>>,
    live_records: SharedLive<Vec<Record>>,
    saved_tx: mpsc::UnboundedSender<RecordSaved>,
    saved_rx: Mutex<Option<mpsc::UnboundedReceiver<RecordSaved>>>,
}

impl InventoryCoordinator {
    /// Creates the coordinator. Live views start on first subscription.
    ///
    /// ## Arguments
    /// * `inventory` - Record repository
    /// * `notifications` - Where mutation notifications are appended
    /// * `live` - Debounce period and grace period
    pub fn new(
        inventory: InventoryRepository,
        notifications: NotificationRepository,
        live: &LiveSettings,
    ) -> Self {
        let grace = live.grace_period();
        let period = live.debounce();

        let all_records = {
            let repo = inventory.clone();
            SharedLive::new("all_records", grace, move || repo.all_records())
        };

        let (search, search_rx) = watch::channel(String::new());

        let live_records = {
            let all = all_records.clone();
            SharedLive::new("live_records", grace, move || {
                let mut rx = search_rx.clone();
                let current = rx.borrow_and_update().clone();

                let queries = stream::once(future::ready(current))
                    .chain(debounce(WatchStream::from_changes(rx), period))
                    .map(|text| {
                        let query = SearchQuery::new(&text);
                        debug!(needle = %query.needle(), "Search text applied");
                        query
                    });

                combine_latest(queries, all.subscribe())
                    .map(|(query, records)| query.filter(records))
                    .boxed()
            })
        };

        let (saved_tx, saved_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(InventoryViewState::default());

        InventoryCoordinator {
            inner: Arc::new(Inner {
                inventory,
                notifications,
                state,
                in_flight: AtomicUsize::new(0),
                search,
                all_records,
                live_records,
                saved_tx,
                saved_rx: Mutex::new(Some(saved_rx)),
            }),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Receiver for the view state.
    pub fn state(&self) -> watch::Receiver<InventoryViewState> {
        self.inner.state.subscribe()
    }

    /// Current view state.
    pub fn snapshot(&self) -> InventoryViewState {
        self.inner.state.borrow().clone()
    }

    /// Record list filtered by the (debounced) search text.
    pub fn live_records(&self) -> LiveSubscription<Vec<Record>> {
        self.inner.live_records.subscribe()
    }

    /// Every record, unfiltered.
    pub fn all_records(&self) -> LiveSubscription<Vec<Record>> {
        self.inner.all_records.subscribe()
    }

    /// Shared view behind [`all_records`](Self::all_records) (diagnostics).
    pub fn all_records_view(&self) -> &SharedLive<Vec<Record>> {
        &self.inner.all_records
    }

    /// Shared view behind [`live_records`](Self::live_records) (diagnostics).
    pub fn live_records_view(&self) -> &SharedLive<Vec<Record>> {
        &self.inner.live_records
    }

    /// Hands out the save-event receiver. Only the first call gets it.
    pub fn take_saved_events(&self) -> Option<mpsc::UnboundedReceiver<RecordSaved>> {
        self.inner
            .saved_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    // =========================================================================
    // Synchronous State Changes
    // =========================================================================

    /// Updates the search text. The derived list follows after the debounce.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.search.send_if_modified(|current| {
            if *current == text {
                return false;
            }
            current.clone_from(&text);
            true
        });
        self.inner.state.send_if_modified(|s| {
            if s.search_text == text {
                return false;
            }
            s.search_text = text;
            true
        });
    }

    pub fn set_selected(&self, record: Record) {
        self.inner.state.send_modify(|s| s.selected = Some(record));
    }

    pub fn clear_selected(&self) {
        self.inner.state.send_if_modified(|s| s.selected.take().is_some());
    }

    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|s| s.last_error.take().is_some());
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Stores a new record and announces it.
    ///
    /// ## Returns
    /// * `Ok(Record)` - The stored record with its assigned id
    /// * `Err(ActionError)` - Nothing was stored; `last_error` is set
    pub async fn insert_record(&self, record: Record) -> Result<Record, ActionError> {
        let inner = &*self.inner;
        run_action(&inner.state, &inner.in_flight, Action::AddRecord, async {
            let saved = inner.inventory.insert(&record).await?;
            info!(id = saved.id, name = %saved.name, "Record added");

            inner.announce_saved(&saved, SaveKind::Created);
            inner.append_notification(NotificationKind::Added, &saved.name).await;
            Ok::<_, StoreError>(saved)
        })
        .await
    }

    /// Replaces a stored record.
    ///
    /// An id that matches nothing is not a failure: the result is `Ok(0)`
    /// and the notification is still appended.
    pub async fn update_record(&self, record: Record) -> Result<u64, ActionError> {
        let inner = &*self.inner;
        run_action(&inner.state, &inner.in_flight, Action::UpdateRecord, async {
            let rows = inner.inventory.update(&record).await?;
            info!(id = record.id, rows, "Record updated");

            inner.announce_saved(&record, SaveKind::Updated);
            inner.append_notification(NotificationKind::Updated, &record.name).await;
            Ok::<_, StoreError>(rows)
        })
        .await
    }

    /// Deletes a record. Same zero-row behavior as [`update_record`](Self::update_record).
    pub async fn delete_record(&self, record: &Record) -> Result<u64, ActionError> {
        let inner = &*self.inner;
        run_action(&inner.state, &inner.in_flight, Action::DeleteRecord, async {
            let rows = inner.inventory.delete(record).await?;
            info!(id = record.id, rows, "Record deleted");

            inner.append_notification(NotificationKind::Deleted, &record.name).await;
            Ok::<_, StoreError>(rows)
        })
        .await
    }

    /// Loads a record into `selected`; `Ok(None)` (and no selection) when
    /// the id is unknown.
    pub async fn load_record(&self, id: i64) -> Result<Option<Record>, ActionError> {
        let inner = &*self.inner;
        let found = run_action(&inner.state, &inner.in_flight, Action::LoadRecord, async {
            inner.inventory.get_by_id(id).await
        })
        .await?;

        if found.is_none() {
            debug!(id, "No record to select");
        }
        let selected = found.clone();
        inner.state.send_modify(|s| s.selected = selected);
        Ok(found)
    }

    /// Validates form input, then inserts (new draft) or updates (existing id).
    ///
    /// Invalid input writes nothing and sets `last_error`.
    pub async fn save_draft(&self, draft: &RecordDraft) -> Result<Record, ActionError> {
        let record = match draft.validate() {
            Ok(record) => record,
            Err(e) => {
                let action = if draft.is_new() {
                    Action::AddRecord
                } else {
                    Action::UpdateRecord
                };
                let error = ActionError::Invalid(e);
                record_failure(&self.inner.state, action, &error);
                return Err(error);
            }
        };

        if record.is_new() {
            self.insert_record(record).await
        } else {
            self.update_record(record.clone()).await?;
            Ok(record)
        }
    }
}

impl Inner {
    fn announce_saved(&self, record: &Record, kind: SaveKind) {
        let event = RecordSaved {
            record: record.clone(),
            kind,
        };
        if self.saved_tx.send(event).is_err() {
            debug!(id = record.id, "Save event dropped, receiver gone");
        }
    }

    /// Best effort; the record change already happened.
    async fn append_notification(&self, kind: NotificationKind, record_name: &str) {
        let notification = Notification::for_record(kind, record_name);
        if let Err(e) = self.notifications.insert(&notification).await {
            warn!(
                kind = %kind,
                record = record_name,
                error = %e,
                "Notification not recorded, record change kept"
            );
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::Money;
    use shelf_db::{Database, DbConfig};
    use std::time::Duration;

    async fn coordinator() -> (Database, InventoryCoordinator) {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        let live = LiveSettings {
            debounce_ms: 20,
            grace_period_ms: 100,
        };
        let coordinator = InventoryCoordinator::new(
            InventoryRepository::new(&db),
            NotificationRepository::new(&db),
            &live,
        );
        (db, coordinator)
    }

    fn dune() -> Record {
        Record::new("Dune", "Fiction", 5, Money::from_cents(1299))
    }

    #[tokio::test]
    async fn test_saved_events_are_handed_out_once() {
        let (_db, inventory) = coordinator().await;
        let mut saved = inventory.take_saved_events().unwrap();
        assert!(inventory.take_saved_events().is_none());

        let stored = inventory.insert_record(dune()).await.unwrap();
        let event = saved.recv().await.unwrap();
        assert_eq!(event.kind, SaveKind::Created);
        assert_eq!(event.record, stored);

        let edited = Record {
            quantity: 0,
            ..stored
        };
        inventory.update_record(edited.clone()).await.unwrap();
        let event = saved.recv().await.unwrap();
        assert_eq!(event.kind, SaveKind::Updated);
        assert_eq!(event.record, edited);

        // Deletes do not count as saves.
        inventory.delete_record(&edited).await.unwrap();
        assert!(saved.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failure_sets_and_success_clears_last_error() {
        let (_db, inventory) = coordinator().await;
        let stored = inventory.insert_record(dune()).await.unwrap();

        // Same id again violates the primary key.
        let err = inventory.insert_record(stored.clone()).await.unwrap_err();
        let snapshot = inventory.snapshot();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.last_error, Some(err.to_string()));
        assert!(err.to_string().starts_with("Error adding record: "));

        inventory.load_record(stored.id).await.unwrap();
        assert_eq!(inventory.snapshot().last_error, None);
    }

    #[tokio::test]
    async fn test_selection() {
        let (_db, inventory) = coordinator().await;
        let stored = inventory.insert_record(dune()).await.unwrap();

        assert_eq!(inventory.load_record(stored.id).await.unwrap(), Some(stored.clone()));
        assert_eq!(inventory.snapshot().selected, Some(stored.clone()));

        inventory.clear_selected();
        assert_eq!(inventory.snapshot().selected, None);

        inventory.set_selected(stored.clone());
        assert_eq!(inventory.load_record(999).await.unwrap(), None);
        assert_eq!(inventory.snapshot().selected, None);
        assert_eq!(inventory.snapshot().last_error, None);
    }

    #[tokio::test]
    async fn test_invalid_draft_writes_nothing() {
        let (db, inventory) = coordinator().await;

        let draft = RecordDraft {
            name: "Dune".into(),
            category: "Fiction".into(),
            quantity: "five".into(),
            price: "12.99".into(),
            ..RecordDraft::default()
        };
        let err = inventory.save_draft(&draft).await.unwrap_err();
        assert!(matches!(err, ActionError::Invalid(_)));
        assert_eq!(inventory.snapshot().last_error, Some(err.to_string()));
        assert_eq!(db.records().count().await.unwrap(), 0);

        inventory.clear_error();
        assert_eq!(inventory.snapshot().last_error, None);
    }

    #[tokio::test]
    async fn test_save_draft_creates_then_edits() {
        let (db, inventory) = coordinator().await;

        let draft = RecordDraft {
            name: "Dune".into(),
            category: "Fiction".into(),
            quantity: "5".into(),
            price: "12.99".into(),
            ..RecordDraft::default()
        };
        let created = inventory.save_draft(&draft).await.unwrap();
        assert!(!created.is_new());

        let mut edit = RecordDraft::from_record(&created);
        edit.quantity = "0".into();
        let edited = inventory.save_draft(&edit).await.unwrap();
        assert_eq!(edited.id, created.id);

        let stored = db.records().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 0);
        assert_eq!(stored.price(), Money::from_cents(1299));
    }

    #[tokio::test]
    async fn test_search_text_updates_state_immediately() {
        let (_db, inventory) = coordinator().await;
        let mut state = inventory.state();

        inventory.set_search_text("du");
        assert!(state.has_changed().unwrap());
        assert_eq!(state.borrow_and_update().search_text, "du");

        // Same text is not a change.
        inventory.set_search_text("du");
        assert!(!state.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_live_records_start_with_current_search() {
        let (_db, inventory) = coordinator().await;
        inventory.insert_record(dune()).await.unwrap();
        inventory
            .insert_record(Record::new("Cosmos", "Science", 2, Money::from_cents(999)))
            .await
            .unwrap();

        inventory.set_search_text("cos");
        let mut list = inventory.live_records();
        let first = tokio::time::timeout(Duration::from_secs(1), list.next())
            .await
            .unwrap()
            .unwrap();
        let names: Vec<_> = first.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Cosmos"]);
    }
}
