//! # shelf-core: Domain Model for ShelfStock
//!
//! Pure types and rules for the inventory-and-notification core. Nothing in
//! this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ShelfStock Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (external)                         │   │
//! │  │    List screen ──► Form screen ──► Notification screen          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ watch receivers / coordinator calls    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         shelf-sync (coordinators, repositories, live views)     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shelf-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  search   │  │ validation│  │   │
//! │  │   │  Record   │  │   Money   │  │SearchQuery│  │RecordDraft│  │   │
//! │  │   │ Notific.  │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO ASYNC                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shelf-db (SQLite stores)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `Record`, `Notification`, `NotificationKind`
//! - [`money`] - Exact prices in integer cents
//! - [`search`] - The record search predicate
//! - [`validation`] - Form input to `Record`
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shelf_core::{Money, Notification, NotificationKind, Record, SearchQuery};
//!
//! let dune = Record::new("Dune", "Fiction", 5, Money::from_cents(1299));
//! assert!(SearchQuery::new("fic").matches(&dune));
//!
//! let added = Notification::for_record(NotificationKind::Added, &dune.name);
//! assert!(added.message.contains("Dune"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod search;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use search::SearchQuery;
pub use types::*;
pub use validation::RecordDraft;
