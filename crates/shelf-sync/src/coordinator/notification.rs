//! # Notification Coordinator
//!
//! View state for the notification list and the read/clear actions.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use shelf_core::Notification;

use super::{run_action, Action, ActionError, ViewState};
use crate::config::LiveSettings;
use crate::live::{LiveSubscription, SharedLive};
use crate::repository::NotificationRepository;

/// What the notification screen renders besides the lists themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationViewState {
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl ViewState for NotificationViewState {
    fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}

/// Owns the notification view state. Cheap to clone.
#[derive(Clone)]
pub struct NotificationCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    repo: NotificationRepository,
    state: watch::Sender<NotificationViewState>,
    in_flight: AtomicUsize,
    all: SharedLive<Vec<Notification>>,
    unread: SharedLive<Vec<Notification>>,
}

impl NotificationCoordinator {
    pub fn new(repo: NotificationRepository, live: &LiveSettings) -> Self {
        let grace = live.grace_period();

        let all = {
            let repo = repo.clone();
            SharedLive::new("all_notifications", grace, move || repo.all_notifications())
        };
        let unread = {
            let repo = repo.clone();
            SharedLive::new("unread_notifications", grace, move || {
                repo.unread_notifications()
            })
        };

        let (state, _) = watch::channel(NotificationViewState::default());

        NotificationCoordinator {
            inner: Arc::new(Inner {
                repo,
                state,
                in_flight: AtomicUsize::new(0),
                all,
                unread,
            }),
        }
    }

    pub fn state(&self) -> watch::Receiver<NotificationViewState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> NotificationViewState {
        self.inner.state.borrow().clone()
    }

    /// Every notification, newest first.
    pub fn all_notifications(&self) -> LiveSubscription<Vec<Notification>> {
        self.inner.all.subscribe()
    }

    /// Unread notifications, newest first.
    pub fn unread_notifications(&self) -> LiveSubscription<Vec<Notification>> {
        self.inner.unread.subscribe()
    }

    /// Marks one notification read. An unknown id is not an error.
    pub async fn mark_as_read(&self, id: i64) -> Result<(), ActionError> {
        let inner = &*self.inner;
        let rows = run_action(
            &inner.state,
            &inner.in_flight,
            Action::MarkNotificationRead,
            inner.repo.mark_as_read(id),
        )
        .await?;

        if rows > 0 {
            info!(id, "Notification marked read");
        }
        Ok(())
    }

    /// Marks everything read. Idempotent.
    pub async fn mark_all_as_read(&self) -> Result<u64, ActionError> {
        let inner = &*self.inner;
        let rows = run_action(
            &inner.state,
            &inner.in_flight,
            Action::MarkAllNotificationsRead,
            inner.repo.mark_all_as_read(),
        )
        .await?;

        info!(rows, "All notifications marked read");
        Ok(rows)
    }

    /// Deletes every notification. Idempotent.
    pub async fn clear_all(&self) -> Result<u64, ActionError> {
        let inner = &*self.inner;
        let rows = run_action(
            &inner.state,
            &inner.in_flight,
            Action::ClearNotifications,
            inner.repo.delete_all(),
        )
        .await?;

        info!(rows, "Notifications cleared");
        Ok(rows)
    }

    /// Unread notifications (for a badge). Does not touch the view state.
    pub async fn unread_count(&self) -> Result<i64, ActionError> {
        self.inner
            .repo
            .unread_count()
            .await
            .map_err(|e| ActionError::Store {
                action: Action::CountUnread,
                message: e.to_string(),
            })
    }

    pub fn clear_error(&self) {
        self.inner
            .state
            .send_if_modified(|s| s.last_error.take().is_some());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use shelf_core::NotificationKind;
    use shelf_db::{Database, DbConfig};

    async fn coordinator() -> (Database, NotificationCoordinator) {
        let db = Database::connect(DbConfig::in_memory()).await.unwrap();
        let coordinator = NotificationCoordinator::new(
            NotificationRepository::new(&db),
            &LiveSettings::default(),
        );
        (db, coordinator)
    }

    async fn seed(db: &Database, names: &[&str]) -> Vec<Notification> {
        let mut stored = Vec::new();
        for name in names {
            stored.push(
                db.notifications()
                    .insert(&Notification::for_record(NotificationKind::Added, name))
                    .await
                    .unwrap(),
            );
        }
        stored
    }

    #[tokio::test]
    async fn test_mark_as_read_updates_unread_view() {
        let (db, notifications) = coordinator().await;
        let stored = seed(&db, &["Dune", "Cosmos"]).await;

        let mut unread = notifications.unread_notifications();
        assert_eq!(unread.next().await.unwrap().len(), 2);

        notifications.mark_as_read(stored[0].id).await.unwrap();
        let remaining = unread.next().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, stored[1].id);

        // Unknown id: fine, nothing changes.
        notifications.mark_as_read(999).await.unwrap();
        assert_eq!(notifications.snapshot(), NotificationViewState::default());
        assert_eq!(notifications.unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_all_and_clear_are_idempotent() {
        let (db, notifications) = coordinator().await;
        seed(&db, &["Dune", "Cosmos", "SPQR"]).await;

        assert_eq!(notifications.mark_all_as_read().await.unwrap(), 3);
        assert_eq!(notifications.mark_all_as_read().await.unwrap(), 0);
        assert_eq!(notifications.unread_count().await.unwrap(), 0);

        assert_eq!(notifications.clear_all().await.unwrap(), 3);
        assert_eq!(notifications.clear_all().await.unwrap(), 0);

        let mut all = notifications.all_notifications();
        assert!(all.next().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_sets_last_error() {
        let (db, notifications) = coordinator().await;
        db.close().await;

        let err = notifications.mark_all_as_read().await.unwrap_err();
        let snapshot = notifications.snapshot();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.last_error, Some(err.to_string()));
        assert!(err
            .to_string()
            .starts_with("Error marking all notifications as read: "));

        notifications.clear_error();
        assert_eq!(notifications.snapshot().last_error, None);
    }
}
