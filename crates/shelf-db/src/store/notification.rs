//! # Notification Store
//!
//! Database operations for the notification log.
//!
//! Listings are newest first: `created_at DESC`, then `id DESC` so two
//! notifications stamped in the same millisecond still come out in insertion
//! order reversed.

use sqlx::SqlitePool;
use tracing::debug;

use crate::change::{ChangeTracker, Table};
use crate::error::StoreResult;
use shelf_core::Notification;

const NOTIFICATION_COLUMNS: &str = "id, title, message, kind, created_at, is_read";

/// Store for notifications.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    pool: SqlitePool,
    changes: ChangeTracker,
}

impl NotificationStore {
    /// Creates a new NotificationStore.
    pub fn new(pool: SqlitePool, changes: ChangeTracker) -> Self {
        NotificationStore { pool, changes }
    }

    /// Appends a notification.
    ///
    /// ## Returns
    /// * `Ok(Notification)` - The stored notification, carrying its new id
    pub async fn insert(&self, notification: &Notification) -> StoreResult<Notification> {
        debug!(kind = %notification.kind, "Inserting notification");

        let result = sqlx::query(
            r#"
            INSERT INTO notifications (title, message, kind, created_at, is_read)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind)
        .bind(notification.created_at)
        .bind(notification.is_read)
        .execute(&self.pool)
        .await?;

        let mut stored = notification.clone();
        stored.id = result.last_insert_rowid();

        self.changes.notify(Table::Notifications);
        Ok(stored)
    }

    /// Lists every notification, newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications ORDER BY created_at DESC, id DESC",
            NOTIFICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Lists unread notifications, newest first.
    pub async fn list_unread(&self) -> StoreResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications WHERE is_read = 0 ORDER BY created_at DESC, id DESC",
            NOTIFICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Marks one notification read.
    ///
    /// ## Returns
    /// * `Ok(rows)` - `0` when the id is unknown or already read
    pub async fn mark_as_read(&self, id: i64) -> StoreResult<u64> {
        debug!(id, "Marking notification read");

        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?1 AND is_read = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let rows = result.rows_affected();
        if rows > 0 {
            self.changes.notify(Table::Notifications);
        }
        Ok(rows)
    }

    /// Marks every unread notification read.
    ///
    /// ## Returns
    /// * `Ok(rows)` - How many were unread
    pub async fn mark_all_as_read(&self) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE is_read = 0")
            .execute(&self.pool)
            .await?;

        let rows = result.rows_affected();
        debug!(rows, "Marked all notifications read");
        if rows > 0 {
            self.changes.notify(Table::Notifications);
        }
        Ok(rows)
    }

    /// Deletes every notification.
    pub async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM notifications")
            .execute(&self.pool)
            .await?;

        let rows = result.rows_affected();
        debug!(rows, "Deleted all notifications");
        if rows > 0 {
            self.changes.notify(Table::Notifications);
        }
        Ok(rows)
    }

    /// Counts unread notifications (badge).
    pub async fn unread_count(&self) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE is_read = 0")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
