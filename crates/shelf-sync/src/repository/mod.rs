//! # Repository Module
//!
//! Result-wrapping facades over the stores, plus their live views.
//!
//! ## Repository Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    What a Repository Adds                               │
//! │                                                                         │
//! │  Coordinator                                                            │
//! │       │                                                                 │
//! │       │  repo.insert(&record).await                                     │
//! │       ▼                                                                 │
//! │  InventoryRepository                                                    │
//! │  ├── one-shot calls → StoreResult<T>, failures logged with error!       │
//! │  └── live views     → BoxStream<Vec<T>>, failures logged with warn!     │
//! │       │                and replaced by an empty snapshot                │
//! │       ▼                                                                 │
//! │  RecordStore / NotificationStore (SQL)                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`] - Record CRUD, live list and live search
//! - [`NotificationRepository`] - Notification log, live all/unread lists

pub mod inventory;
pub mod notification;

pub use inventory::InventoryRepository;
pub use notification::NotificationRepository;

use shelf_db::StoreResult;
use tracing::error;

/// Logs a failed store call before handing the result back.
fn logged<T>(operation: &'static str, result: StoreResult<T>) -> StoreResult<T> {
    result.inspect_err(|e| error!(operation, error = %e, "Store operation failed"))
}
