//! # Store Module
//!
//! SQL access for the two tables.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store Layer                                          │
//! │                                                                         │
//! │  shelf-sync repository                                                 │
//! │       │  db.records().insert(&record)                                  │
//! │       ▼                                                                 │
//! │  RecordStore / NotificationStore                                       │
//! │  ├── runs one SQL statement per call                                   │
//! │  ├── maps sqlx::Error → StoreError                                     │
//! │  └── announces the touched table on ChangeTracker (rows > 0)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`RecordStore`] - Inventory record CRUD and search
//! - [`NotificationStore`] - Notification log

pub mod notification;
pub mod record;

pub use notification::NotificationStore;
pub use record::RecordStore;
