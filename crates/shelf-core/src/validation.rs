//! # Validation Module
//!
//! Turns raw form input into a [`Record`].
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (external)                                       │
//! │  └── Collects text fields, shows per-field messages                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: RecordDraft::validate (THIS MODULE)                           │
//! │  ├── name / category required                                           │
//! │  ├── quantity: whole number >= 0                                        │
//! │  └── price: decimal >= 0, at most two places                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite CHECK constraints)                           │
//! │  └── Same rules again; violations come back as StoreError               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shelf_core::validation::RecordDraft;
//!
//! let draft = RecordDraft {
//!     name: "Dune".into(),
//!     category: "Fiction".into(),
//!     quantity: "5".into(),
//!     price: "12.99".into(),
//!     ..RecordDraft::default()
//! };
//! let record = draft.validate().unwrap();
//! assert_eq!(record.price_cents, 1299);
//! assert_eq!(record.author, "Not Provided");
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{or_not_provided, Record, UNSAVED_ID};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted record name.
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted category.
pub const MAX_CATEGORY_LEN: usize = 100;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a record name: required, at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, MAX_NAME_LEN)
}

/// Validates a category: required, at most [`MAX_CATEGORY_LEN`] characters.
pub fn validate_category(category: &str) -> ValidationResult<String> {
    required_text("category", category, MAX_CATEGORY_LEN)
}

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Parses a quantity typed by the user.
///
/// ```rust
/// use shelf_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(" 5 ").unwrap(), 5);
/// assert!(parse_quantity("").is_err());
/// assert!(parse_quantity("five").is_err());
/// assert!(parse_quantity("-1").is_err());
/// ```
pub fn parse_quantity(text: &str) -> ValidationResult<i64> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Required {
            field: "quantity".to_string(),
        });
    }

    let quantity: i64 = text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if quantity < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    Ok(quantity)
}

/// Parses a price typed by the user.
pub fn parse_price(text: &str) -> ValidationResult<Money> {
    let price: Money = text.parse()?;

    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(price)
}

// =============================================================================
// Record Draft
// =============================================================================

/// Raw, unvalidated record input as typed into a create/edit form.
///
/// `id` is [`UNSAVED_ID`] for the create flow and the existing identifier for
/// the edit flow; validation keeps it as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub quantity: String,
    pub price: String,
    pub language: String,
    pub author: String,
    pub description: String,
}

impl RecordDraft {
    /// Pre-fills a draft from a stored record (edit flow).
    pub fn from_record(record: &Record) -> Self {
        RecordDraft {
            id: record.id,
            name: record.name.clone(),
            category: record.category.clone(),
            quantity: record.quantity.to_string(),
            price: format!("{}.{:02}", record.price().dollars(), record.price().cents_part()),
            language: record.language.clone(),
            author: record.author.clone(),
            description: record.description.clone(),
        }
    }

    /// True when the draft describes a record that has not been stored.
    pub fn is_new(&self) -> bool {
        self.id == UNSAVED_ID
    }

    /// Validates every field, reporting all failures at once.
    pub fn errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(e) = validate_name(&self.name) {
            errors.push(e);
        }
        if let Err(e) = validate_category(&self.category) {
            errors.push(e);
        }
        if let Err(e) = parse_quantity(&self.quantity) {
            errors.push(e);
        }
        if let Err(e) = parse_price(&self.price) {
            errors.push(e);
        }
        errors
    }

    /// Validates the draft and builds the record, stopping at the first error.
    pub fn validate(&self) -> ValidationResult<Record> {
        Ok(Record {
            id: self.id,
            name: validate_name(&self.name)?,
            category: validate_category(&self.category)?,
            quantity: parse_quantity(&self.quantity)?,
            price_cents: parse_price(&self.price)?.cents(),
            language: or_not_provided(&self.language),
            author: or_not_provided(&self.author),
            description: or_not_provided(&self.description),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
