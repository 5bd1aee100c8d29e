//! # ShelfApp
//!
//! Composition root: opens the store once and wires every layer to it.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ShelfApp::start(config)                            │
//! │                                                                         │
//! │  1. config.db_config()        resolve the database path                 │
//! │  2. Database::connect         pool + schema (wiped on version mismatch) │
//! │  3. Repositories              inventory + notification repositories     │
//! │  4. Coordinators              debounce / grace period from [live]       │
//! │                                                                         │
//! │  Presentation layer:                                                    │
//! │    app.inventory().state()            → watch::Receiver<view state>     │
//! │    app.inventory().live_records()     → Stream<Vec<Record>>             │
//! │    app.notifications().unread_notifications()                           │
//! │                                                                         │
//! │  ShelfApp::shutdown           closes the pool                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging is not installed here; call [`init_tracing`](crate::init_tracing)
//! first if the host has no subscriber of its own.

use tracing::info;

use shelf_db::Database;

use crate::config::AppConfig;
use crate::coordinator::{InventoryCoordinator, NotificationCoordinator};
use crate::error::SyncResult;
use crate::repository::{InventoryRepository, NotificationRepository};

/// The running application core.
pub struct ShelfApp {
    config: AppConfig,
    db: Database,
    inventory: InventoryCoordinator,
    notifications: NotificationCoordinator,
}

impl ShelfApp {
    /// Opens the store and builds the coordinators.
    ///
    /// ## Returns
    /// * `Ok(ShelfApp)` - Ready; live views start on first subscription
    /// * `Err(SyncError)` - Invalid config or the store could not be opened
    pub async fn start(config: AppConfig) -> SyncResult<Self> {
        config.validate()?;
        let db_config = config.db_config()?;
        info!(path = %db_config.database_path.display(), "Starting ShelfStock core");

        let db = Database::connect(db_config).await?;

        let inventory = InventoryCoordinator::new(
            InventoryRepository::new(&db),
            NotificationRepository::new(&db),
            &config.live,
        );
        let notifications =
            NotificationCoordinator::new(NotificationRepository::new(&db), &config.live);

        info!(
            debounce_ms = config.live.debounce_ms,
            grace_period_ms = config.live.grace_period_ms,
            "ShelfStock core ready"
        );

        Ok(ShelfApp {
            config,
            db,
            inventory,
            notifications,
        })
    }

    pub fn inventory(&self) -> &InventoryCoordinator {
        &self.inventory
    }

    pub fn notifications(&self) -> &NotificationCoordinator {
        &self.notifications
    }

    /// The store handle (diagnostics, seeding, fault injection).
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Closes the store. Coordinator clones still held elsewhere will see
    /// their actions fail from now on.
    pub async fn shutdown(self) {
        info!("Shutting down ShelfStock core");
        self.db.close().await;
    }
}
