//! # shelf-db: Storage Layer for ShelfStock
//!
//! SQLite storage for records and notifications, with change announcements
//! that drive live views.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ShelfStock Data Flow                             │
//! │                                                                         │
//! │  InventoryCoordinator::insert_record                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shelf-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Stores     │    │    Schema    │  │   │
//! │  │   │   (pool.rs)   │    │  (store/*.rs) │    │  (schema.rs) │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ RecordStore   │    │ user_version │  │   │
//! │  │   │ ChangeTracker │    │ Notification- │    │ drop+create  │  │   │
//! │  │   │               │    │   Store       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │          tables: records, notifications                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`schema`] - Table creation, destructive on version change
//! - [`change`] - Table change announcements
//! - [`store`] - Record and notification stores
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelf_db::{Database, DbConfig};
//!
//! let db = Database::connect(DbConfig::new("path/to/shelfstock.db")).await?;
//!
//! let dune = db.records().insert(&record).await?;
//! let fiction = db.records().search("fiction").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod change;
pub mod error;
pub mod pool;
pub mod schema;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use change::{ChangeTracker, Table};
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use store::{NotificationStore, RecordStore};
