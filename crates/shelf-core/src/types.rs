//! # Domain Types
//!
//! Core domain types used throughout ShelfStock.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐          ┌─────────────────────┐              │
//! │  │      Record         │          │    Notification     │              │
//! │  │  ─────────────────  │  name    │  ─────────────────  │              │
//! │  │  id (0 = unsaved)   │ ──────►  │  id                 │              │
//! │  │  name, category     │ (copied  │  title, message     │              │
//! │  │  quantity           │  as text)│  kind               │              │
//! │  │  price_cents        │          │  created_at (ms)    │              │
//! │  │  language, author,  │          │  is_read            │              │
//! │  │  description        │          └─────────────────────┘              │
//! │  └─────────────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A notification never references a record by id: the record's name is
//! copied into the message when the notification is built, so deleting a
//! record leaves its history intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::money::Money;

/// Placeholder stored for optional free-text fields left blank at creation.
pub const NOT_PROVIDED: &str = "Not Provided";

/// Identifier carried by a record or notification that has not been stored.
pub const UNSAVED_ID: i64 = 0;

// =============================================================================
// Record
// =============================================================================

/// One inventory item (a book).
///
/// ## Identity
/// `id == 0` means "not yet stored". The store assigns a fresh, never reused
/// identifier on insert; after that the identifier does not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Units in stock, never negative.
    pub quantity: i64,
    /// Unit price in cents, never negative.
    pub price_cents: i64,
    pub language: String,
    pub author: String,
    pub description: String,
}

impl Record {
    /// Creates an unsaved record. Optional text fields start as
    /// [`NOT_PROVIDED`].
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: i64,
        price: Money,
    ) -> Self {
        Record {
            id: UNSAVED_ID,
            name: name.into(),
            category: category.into(),
            quantity,
            price_cents: price.cents(),
            language: NOT_PROVIDED.to_string(),
            author: NOT_PROVIDED.to_string(),
            description: NOT_PROVIDED.to_string(),
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = or_not_provided(language);
        self
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = or_not_provided(author);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = or_not_provided(description);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// True while the record carries the unsaved sentinel id.
    #[inline]
    pub fn is_new(&self) -> bool {
        self.id == UNSAVED_ID
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Value of the units currently in stock.
    pub fn stock_value(&self) -> Money {
        self.price().times(self.quantity)
    }
}

/// Returns the trimmed text, or [`NOT_PROVIDED`] when it is blank.
pub fn or_not_provided(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        text.to_string()
    }
}

// =============================================================================
// Notification Kind
// =============================================================================

/// The record mutation a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Added,
    Updated,
    Deleted,
}

impl NotificationKind {
    /// Storage code, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Added => "ADDED",
            NotificationKind::Updated => "UPDATED",
            NotificationKind::Deleted => "DELETED",
        }
    }

    /// Notification title for this kind.
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::Added => "Record Added",
            NotificationKind::Updated => "Record Updated",
            NotificationKind::Deleted => "Record Deleted",
        }
    }

    /// Notification message for a record with the given name.
    pub fn message_for(&self, record_name: &str) -> String {
        match self {
            NotificationKind::Added => format!("{} has been added to your inventory", record_name),
            NotificationKind::Updated => format!("{} has been updated", record_name),
            NotificationKind::Deleted => {
                format!("{} has been removed from your inventory", record_name)
            }
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADDED" => Ok(NotificationKind::Added),
            "UPDATED" => Ok(NotificationKind::Updated),
            "DELETED" => Ok(NotificationKind::Deleted),
            other => Err(CoreError::UnknownNotificationKind(other.to_string())),
        }
    }
}

// =============================================================================
// Notification
// =============================================================================

/// An audit-log entry describing one record mutation.
///
/// Everything except `is_read` is fixed once the notification is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    /// Milliseconds since the Unix epoch, taken when the value is constructed.
    pub created_at: i64,
    pub is_read: bool,
}

impl Notification {
    /// Builds an unread, unsaved notification stamped with the current time.
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Notification {
            id: UNSAVED_ID,
            title: title.into(),
            message: message.into(),
            kind,
            created_at: Utc::now().timestamp_millis(),
            is_read: false,
        }
    }

    /// Builds the notification reporting `kind` for the named record.
    ///
    /// ```rust
    /// use shelf_core::{Notification, NotificationKind};
    ///
    /// let n = Notification::for_record(NotificationKind::Added, "Dune");
    /// assert_eq!(n.title, "Record Added");
    /// assert_eq!(n.message, "Dune has been added to your inventory");
    /// ```
    pub fn for_record(kind: NotificationKind, record_name: &str) -> Self {
        Notification::new(kind.title(), kind.message_for(record_name), kind)
    }

    /// Creation time as a UTC timestamp.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
