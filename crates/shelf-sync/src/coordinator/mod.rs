//! # Coordinators
//!
//! Own the view state a presentation layer renders and run every user
//! action against the repositories.
//!
//! ## Action Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        run_action(action, body)                         │
//! │                                                                         │
//! │  LoadingGuard::enter        in_flight += 1, is_loading = true           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  body.catch_unwind().await                                              │
//! │       │                                                                 │
//! │       ├── Ok(Ok(v))   → last_error = None                  → Ok(v)      │
//! │       ├── Ok(Err(e))  → last_error = "Error {action}: {e}" → Err        │
//! │       └── panicked    → last_error = "Unexpected error: …" → Err        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LoadingGuard::drop         in_flight -= 1, is_loading = in_flight > 0  │
//! │                             (also runs when the future is cancelled)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod inventory;
pub mod notification;

pub use inventory::{InventoryCoordinator, InventoryViewState, RecordSaved, SaveKind};
pub use notification::{NotificationCoordinator, NotificationViewState};

use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use shelf_core::ValidationError;
use shelf_db::StoreResult;

// =============================================================================
// Action Error
// =============================================================================

/// A user action that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddRecord,
    UpdateRecord,
    DeleteRecord,
    LoadRecord,
    MarkNotificationRead,
    MarkAllNotificationsRead,
    ClearNotifications,
    CountUnread,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::AddRecord => "adding record",
            Action::UpdateRecord => "updating record",
            Action::DeleteRecord => "deleting record",
            Action::LoadRecord => "retrieving record",
            Action::MarkNotificationRead => "marking notification as read",
            Action::MarkAllNotificationsRead => "marking all notifications as read",
            Action::ClearNotifications => "clearing notifications",
            Action::CountUnread => "counting unread notifications",
        })
    }
}

/// Why an action failed. `to_string()` is exactly what lands in `last_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The store rejected the operation.
    #[error("Error {action}: {message}")]
    Store { action: Action, message: String },

    /// The action panicked.
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// Form input did not validate; nothing was written.
    #[error("{0}")]
    Invalid(#[from] ValidationError),
}

// =============================================================================
// View State Plumbing
// =============================================================================

/// The loading/error part every coordinator's view state carries.
pub(crate) trait ViewState {
    fn set_loading(&mut self, loading: bool);
    fn set_error(&mut self, error: Option<String>);
}

/// Keeps `is_loading` true while at least one action is in flight.
///
/// The counter is only touched inside `send_modify`, so the flag always
/// agrees with it.
struct LoadingGuard<'a, S: ViewState> {
    state: &'a watch::Sender<S>,
    in_flight: &'a AtomicUsize,
}

impl<'a, S: ViewState> LoadingGuard<'a, S> {
    fn enter(state: &'a watch::Sender<S>, in_flight: &'a AtomicUsize) -> Self {
        state.send_modify(|s| {
            in_flight.fetch_add(1, Ordering::SeqCst);
            s.set_loading(true);
        });
        LoadingGuard { state, in_flight }
    }
}

impl<S: ViewState> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let in_flight = self.in_flight;
        self.state.send_modify(|s| {
            let remaining = in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            s.set_loading(remaining > 0);
        });
    }
}

/// Runs one action body with the loading flag raised and records its outcome
/// in `last_error`.
pub(crate) async fn run_action<S, T, Fut>(
    state: &watch::Sender<S>,
    in_flight: &AtomicUsize,
    action: Action,
    body: Fut,
) -> Result<T, ActionError>
where
    S: ViewState,
    Fut: Future<Output = StoreResult<T>>,
{
    let _loading = LoadingGuard::enter(state, in_flight);

    let result = match AssertUnwindSafe(body).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ActionError::Store {
            action,
            message: e.to_string(),
        }),
        Err(panic) => Err(ActionError::Unexpected(panic_message(&*panic))),
    };

    match &result {
        Ok(_) => {
            debug!(action = %action, "Action succeeded");
            state.send_modify(|s| s.set_error(None));
        }
        Err(e) => record_failure(state, action, e),
    }

    result
}

/// Writes a failure to `last_error`.
pub(crate) fn record_failure<S: ViewState>(
    state: &watch::Sender<S>,
    action: Action,
    error: &ActionError,
) {
    warn!(action = %action, error = %error, "Action failed");
    let message = error.to_string();
    state.send_modify(|s| s.set_error(Some(message)));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
