//! # Notification Repository
//!
//! The notification log as the coordinators see it. Listings and live views
//! are newest first.

use futures_util::stream::BoxStream;

use shelf_core::Notification;
use shelf_db::{ChangeTracker, Database, NotificationStore, StoreResult, Table};

use super::logged;
use crate::live::live_query;

/// Repository for notifications.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    store: NotificationStore,
    changes: ChangeTracker,
}

impl NotificationRepository {
    pub fn new(db: &Database) -> Self {
        NotificationRepository {
            store: db.notifications(),
            changes: db.changes().clone(),
        }
    }

    /// Appends a notification and returns it with its assigned id.
    pub async fn insert(&self, notification: &Notification) -> StoreResult<Notification> {
        logged("insert notification", self.store.insert(notification).await)
    }

    /// Marks one notification read. Unknown or already-read ids change nothing.
    pub async fn mark_as_read(&self, id: i64) -> StoreResult<u64> {
        logged("mark notification read", self.store.mark_as_read(id).await)
    }

    pub async fn mark_all_as_read(&self) -> StoreResult<u64> {
        logged("mark all notifications read", self.store.mark_all_as_read().await)
    }

    pub async fn delete_all(&self) -> StoreResult<u64> {
        logged("delete all notifications", self.store.delete_all().await)
    }

    /// Unread notifications (for a badge).
    pub async fn unread_count(&self) -> StoreResult<i64> {
        logged("count unread notifications", self.store.unread_count().await)
    }

    /// Live list of every notification, newest first.
    pub fn all_notifications(&self) -> BoxStream<'static, Vec<Notification>> {
        let store = self.store.clone();
        live_query(&self.changes, Table::Notifications, move || {
            let store = store.clone();
            async move { store.list_all().await }
        })
    }

    /// Live list of unread notifications, newest first.
    pub fn unread_notifications(&self) -> BoxStream<'static, Vec<Notification>> {
        let store = self.store.clone();
        live_query(&self.changes, Table::Notifications, move || {
            let store = store.clone();
            async move { store.list_unread().await }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
