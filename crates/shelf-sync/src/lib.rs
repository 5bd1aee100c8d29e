//! # shelf-sync: Live Views & Coordinators for ShelfStock
//!
//! This crate keeps query results live and owns the view state a
//! presentation layer renders. It never draws anything itself.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ShelfStock Core Layers                           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │                 ShelfApp (composition root)                      │   │
//! │  │  AppConfig → Database::connect → repositories → coordinators     │   │
//! │  └────────────────────────────┬─────────────────────────────────────┘   │
//! │                               │                                         │
//! │         ┌─────────────────────┴─────────────────────┐                   │
//! │         ▼                                           ▼                   │
//! │  ┌───────────────────────┐              ┌───────────────────────┐       │
//! │  │ InventoryCoordinator  │              │NotificationCoordinator│       │
//! │  │                       │              │                       │       │
//! │  │ search text (debounce)│              │ is_loading            │       │
//! │  │ is_loading/last_error │              │ last_error            │       │
//! │  │ selected, save events │              │ mark read / clear     │       │
//! │  │ one notification per  │              │                       │       │
//! │  │ successful mutation   │              │                       │       │
//! │  └──────────┬────────────┘              └──────────┬────────────┘       │
//! │             ▼                                      ▼                    │
//! │  ┌───────────────────────┐              ┌───────────────────────┐       │
//! │  │ InventoryRepository   │              │ NotificationRepository│       │
//! │  │ StoreResult + logging │              │ StoreResult + logging │       │
//! │  └──────────┬────────────┘              └──────────┬────────────┘       │
//! │             │        live_query / SharedLive       │                    │
//! │             ▼                                      ▼                    │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  shelf-db: RecordStore, NotificationStore, ChangeTracker         │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`app`] - `ShelfApp` composition root
//! - [`config`] - TOML + environment configuration
//! - [`coordinator`] - View state and user actions
//! - [`error`] - Crate error type
//! - [`live`] - Live queries, shared views, debounce, combine-latest
//! - [`logging`] - `tracing` subscriber setup
//! - [`repository`] - Result-wrapping store facades
//!
//! ## Example
//! ```rust,ignore
//! use futures_util::StreamExt;
//! use shelf_sync::{init_tracing, AppConfig, ShelfApp};
//!
//! let config = AppConfig::load_or_default(None);
//! init_tracing(&config.logging)?;
//!
//! let app = ShelfApp::start(config).await?;
//! let inventory = app.inventory();
//!
//! inventory.set_search_text("dune");
//! let mut records = inventory.live_records();
//! while let Some(list) = records.next().await {
//!     render(&list);
//! }
//! ```

pub mod app;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod live;
pub mod logging;
pub mod repository;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use app::ShelfApp;
pub use config::{AppConfig, DatabaseSettings, LiveSettings, LoggingSettings};
pub use coordinator::{
    Action, ActionError, InventoryCoordinator, InventoryViewState, NotificationCoordinator,
    NotificationViewState, RecordSaved, SaveKind,
};
pub use error::{SyncError, SyncResult};
pub use live::{LiveSubscription, SharedLive};
pub use logging::init_tracing;
pub use repository::{InventoryRepository, NotificationRepository};
