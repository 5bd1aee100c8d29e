//! # Change Tracking
//!
//! Announces which table a successful write touched, so live queries know
//! when to re-read.
//!
//! ```text
//!   RecordStore::insert ──┐
//!   RecordStore::update ──┤                       ┌──► live query (records)
//!   RecordStore::delete ──┼──► ChangeTracker ─────┼──► live query (records)
//!   NotificationStore::* ─┘    (broadcast<Table>) └──► live query (notifications)
//! ```
//!
//! Only writes that affected at least one row are announced. A subscriber
//! that falls behind gets `RecvError::Lagged`, which live queries treat as
//! "something changed".

use std::fmt;
use tokio::sync::broadcast;
use tracing::trace;

/// Buffered change events per subscriber before it starts lagging.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A table whose contents can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Records,
    Notifications,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Records => "records",
            Table::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fan-out of table change events. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    tx: broadcast::Sender<Table>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        ChangeTracker { tx }
    }

    /// Subscribes to every change announced after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.tx.subscribe()
    }

    /// Announces a change. Having no subscribers is fine.
    pub fn notify(&self, table: Table) {
        let receivers = self.tx.send(table).unwrap_or(0);
        trace!(table = %table, receivers, "Change announced");
    }

    /// Number of live subscribers (diagnostics and tests).
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_changes() {
        let tracker = ChangeTracker::new();
        let mut rx = tracker.subscribe();
        let mut rx2 = tracker.clone().subscribe();

        tracker.notify(Table::Records);
        tracker.notify(Table::Notifications);

        assert_eq!(rx.recv().await.unwrap(), Table::Records);
        assert_eq!(rx.recv().await.unwrap(), Table::Notifications);
        assert_eq!(rx2.recv().await.unwrap(), Table::Records);
        assert_eq!(tracker.subscriber_count(), 2);
    }

    #[test]
    fn test_notify_without_subscribers() {
        let tracker = ChangeTracker::default();
        tracker.notify(Table::Records);
        assert_eq!(tracker.subscriber_count(), 0);
    }
}
