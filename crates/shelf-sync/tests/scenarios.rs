//! End-to-end behavior of the coordinators against a real SQLite store.

use futures_util::{Stream, StreamExt};
use std::time::Duration;
use tokio::time::timeout;

use shelf_core::{Money, NotificationKind, Record};
use shelf_sync::{AppConfig, ShelfApp};

const WAIT: Duration = Duration::from_secs(5);

async fn start(debounce_ms: u64, grace_ms: u64) -> ShelfApp {
    ShelfApp::start(AppConfig::in_memory(debounce_ms, grace_ms))
        .await
        .unwrap()
}

/// Waits for the first emission satisfying `accept`.
async fn next_matching<T, S>(stream: &mut S, accept: impl Fn(&T) -> bool) -> T
where
    S: Stream<Item = T> + Unpin,
{
    timeout(WAIT, async {
        loop {
            let item = stream.next().await.expect("live view ended");
            if accept(&item) {
                return item;
            }
        }
    })
    .await
    .expect("timed out waiting for live view")
}

fn dune() -> Record {
    Record::new("Dune", "Fiction", 5, Money::from_cents(1299))
}

// =============================================================================
// Record mutations
// =============================================================================

#[tokio::test]
async fn insert_shows_up_live_with_one_added_notification() {
    let app = start(20, 1_000).await;
    let inventory = app.inventory();
    let mut list = inventory.live_records();

    let saved = inventory.insert_record(dune()).await.unwrap();
    assert_ne!(saved.id, 0);

    let live = next_matching(&mut list, |records: &Vec<Record>| !records.is_empty()).await;
    assert_eq!(live, vec![saved.clone()]);
    assert_eq!(live[0].price().to_string(), "$12.99");

    let notifications = app.database().notifications().list_all().await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Added);
    assert!(notifications[0].message.contains("Dune"));
    assert!(!notifications[0].is_read);

    let state = inventory.snapshot();
    assert!(!state.is_loading);
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn update_to_zero_stock_is_reflected_with_one_updated_notification() {
    let app = start(20, 1_000).await;
    let inventory = app.inventory();
    let saved = inventory.insert_record(dune()).await.unwrap();

    let mut list = inventory.live_records();
    next_matching(&mut list, |records: &Vec<Record>| records.len() == 1).await;

    let rows = inventory
        .update_record(saved.clone().with_quantity(0))
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let live = next_matching(&mut list, |records: &Vec<Record>| {
        records.first().is_some_and(|r| r.quantity == 0)
    })
    .await;
    assert_eq!(live[0].id, saved.id);

    let kinds: Vec<_> = app
        .database()
        .notifications()
        .list_all()
        .await
        .unwrap()
        .iter()
        .map(|n| n.kind)
        .collect();
    assert_eq!(kinds, vec![NotificationKind::Updated, NotificationKind::Added]);
}

#[tokio::test]
async fn deleting_an_absent_record_succeeds_and_still_notifies() {
    let app = start(20, 1_000).await;
    let inventory = app.inventory();

    let ghost = Record {
        id: 7,
        ..dune()
    };
    assert_eq!(inventory.delete_record(&ghost).await.unwrap(), 0);
    assert_eq!(inventory.snapshot().last_error, None);

    let notifications = app.database().notifications().list_all().await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Deleted);
    assert_eq!(notifications[0].message, "Dune has been removed from your inventory");
}

#[tokio::test]
async fn loading_an_unknown_id_selects_nothing_without_error() {
    let app = start(20, 1_000).await;
    let inventory = app.inventory();

    assert_eq!(inventory.load_record(999).await.unwrap(), None);

    let state = inventory.snapshot();
    assert_eq!(state.selected, None);
    assert_eq!(state.last_error, None);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn failed_notification_append_keeps_the_record_change() {
    let app = start(20, 1_000).await;
    sqlx::query("DROP TABLE notifications")
        .execute(app.database().pool())
        .await
        .unwrap();

    let inventory = app.inventory();
    let saved = inventory.insert_record(dune()).await.unwrap();

    let stored = app.database().records().get_by_id(saved.id).await.unwrap();
    assert_eq!(stored, Some(saved));
    assert_eq!(inventory.snapshot().last_error, None);
}

#[tokio::test]
async fn failed_mutation_creates_no_notification() {
    let app = start(20, 1_000).await;
    let inventory = app.inventory();
    let saved = inventory.insert_record(dune()).await.unwrap();

    // Reusing the id violates the primary key.
    let err = inventory.insert_record(saved).await.unwrap_err();
    assert_eq!(inventory.snapshot().last_error, Some(err.to_string()));

    let notifications = app.database().notifications().list_all().await.unwrap();
    assert_eq!(notifications.len(), 1);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn rapid_search_edits_apply_once() {
    let app = start(300, 1_000).await;
    let inventory = app.inventory();
    for (name, category) in [("Abc Primer", "Education"), ("Abacus", "Math"), ("Dune", "Fiction")] {
        inventory
            .insert_record(Record::new(name, category, 1, Money::from_cents(500)))
            .await
            .unwrap();
    }

    let mut list = inventory.live_records();
    let initial = next_matching(&mut list, |records: &Vec<Record>| records.len() == 3).await;
    assert_eq!(initial.len(), 3);

    for text in ["a", "ab", "abc"] {
        inventory.set_search_text(text);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(inventory.snapshot().search_text, "abc");

    let filtered = timeout(WAIT, list.next()).await.unwrap().unwrap();
    let names: Vec<_> = filtered.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Abc Primer"]);

    // Nothing else was applied in between or afterwards.
    assert!(timeout(Duration::from_millis(500), list.next()).await.is_err());
}

#[tokio::test]
async fn blank_search_shows_everything_and_matches_category() {
    let app = start(20, 1_000).await;
    let inventory = app.inventory();
    inventory.insert_record(dune()).await.unwrap();
    inventory
        .insert_record(Record::new("Cosmos", "Science", 2, Money::from_cents(999)))
        .await
        .unwrap();

    let mut list = inventory.live_records();
    next_matching(&mut list, |records: &Vec<Record>| records.len() == 2).await;

    inventory.set_search_text("  FICTION ");
    let filtered = next_matching(&mut list, |records: &Vec<Record>| records.len() == 1).await;
    assert_eq!(filtered[0].name, "Dune");

    inventory.set_search_text("   ");
    next_matching(&mut list, |records: &Vec<Record>| records.len() == 2).await;
}

#[tokio::test]
async fn search_folds_case_beyond_ascii() {
    let app = start(20, 1_000).await;
    let inventory = app.inventory();
    inventory
        .insert_record(Record::new("Émile Zola", "Littérature", 3, Money::from_cents(1500)))
        .await
        .unwrap();
    inventory.insert_record(dune()).await.unwrap();

    let mut list = inventory.live_records();
    next_matching(&mut list, |records: &Vec<Record>| records.len() == 2).await;

    inventory.set_search_text("émile");
    let filtered = next_matching(&mut list, |records: &Vec<Record>| records.len() == 1).await;
    let names: Vec<_> = filtered.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Émile Zola"]);

    // The store agrees with the live list.
    let from_store = app.database().records().search("ÉMILE").await.unwrap();
    assert_eq!(from_store, filtered);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn mark_all_as_read_is_idempotent() {
    let app = start(20, 1_000).await;
    let inventory = app.inventory();
    let notifications = app.notifications();

    let saved = inventory.insert_record(dune()).await.unwrap();
    inventory.delete_record(&saved).await.unwrap();

    let mut unread = notifications.unread_notifications();
    next_matching(&mut unread, |list: &Vec<_>| list.len() == 2).await;

    assert_eq!(notifications.mark_all_as_read().await.unwrap(), 2);
    next_matching(&mut unread, |list: &Vec<_>| list.is_empty()).await;

    assert_eq!(notifications.mark_all_as_read().await.unwrap(), 0);
    assert_eq!(notifications.unread_count().await.unwrap(), 0);
    assert_eq!(notifications.snapshot().last_error, None);
}

#[tokio::test]
async fn clearing_notifications_empties_the_list() {
    let app = start(20, 1_000).await;
    app.inventory().insert_record(dune()).await.unwrap();

    let notifications = app.notifications();
    let mut all = notifications.all_notifications();
    next_matching(&mut all, |list: &Vec<_>| list.len() == 1).await;

    notifications.clear_all().await.unwrap();
    next_matching(&mut all, |list: &Vec<_>| list.is_empty()).await;

    // Records are untouched.
    assert_eq!(app.database().records().count().await.unwrap(), 1);
}

// =============================================================================
// Shared live views
// =============================================================================

#[tokio::test]
async fn shared_view_is_reused_within_grace_and_restarted_after() {
    let app = start(20, 200).await;
    let inventory = app.inventory();
    let view = inventory.all_records_view();

    let mut first = inventory.all_records();
    let mut second = inventory.all_records();
    timeout(WAIT, first.next()).await.unwrap().unwrap();
    timeout(WAIT, second.next()).await.unwrap().unwrap();
    assert_eq!(view.subscriber_count(), 2);
    assert_eq!(view.start_count(), 1);

    drop(first);
    drop(second);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(view.is_active());

    let mut again = inventory.all_records();
    timeout(WAIT, again.next()).await.unwrap().unwrap();
    assert_eq!(view.start_count(), 1);
    drop(again);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(!view.is_active());

    let saved = inventory.insert_record(dune()).await.unwrap();
    let mut restarted = inventory.all_records();
    let live = next_matching(&mut restarted, |records: &Vec<Record>| !records.is_empty()).await;
    assert_eq!(live, vec![saved]);
    assert_eq!(view.start_count(), 2);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn schema_version_mismatch_wipes_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shelfstock.db");

    let mut config = AppConfig::new();
    config.database.path = Some(path.clone());

    let app = ShelfApp::start(config.clone()).await.unwrap();
    app.inventory().insert_record(dune()).await.unwrap();
    sqlx::query("PRAGMA user_version = 1")
        .execute(app.database().pool())
        .await
        .unwrap();
    app.shutdown().await;

    let app = ShelfApp::start(config.clone()).await.unwrap();
    assert_eq!(app.database().records().count().await.unwrap(), 0);
    let saved = app.inventory().insert_record(dune()).await.unwrap();
    app.shutdown().await;

    // Current version: rows survive a restart.
    let app = ShelfApp::start(config).await.unwrap();
    let stored = app.database().records().get_by_id(saved.id).await.unwrap();
    assert_eq!(stored, Some(saved));
    app.shutdown().await;
}
