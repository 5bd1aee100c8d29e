//! # Record Search
//!
//! The one matching rule used everywhere a record list is narrowed by text.
//!
//! ## Rule
//! ```text
//! query  = trimmed search text
//! blank  → every record matches
//! else   → lowercase(name)     contains lowercase(query)
//!       OR lowercase(category) contains lowercase(query)
//! ```
//!
//! Lowercasing is Unicode-aware (`str::to_lowercase`), so "émile" finds
//! "Émile Zola". SQLite's `lower()` only folds ASCII, so the store applies
//! this rule in memory too (`RecordStore::search`) instead of in SQL.

use crate::types::Record;

/// A normalized search query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(text: &str) -> Self {
        SearchQuery {
            needle: text.trim().to_lowercase(),
        }
    }

    /// True when the query filters nothing.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.needle.is_empty()
    }

    /// The trimmed, lowercased query text.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, record: &Record) -> bool {
        if self.is_blank() {
            return true;
        }
        record.name.to_lowercase().contains(&self.needle)
            || record.category.to_lowercase().contains(&self.needle)
    }

    /// Keeps the matching records, preserving order.
    pub fn filter(&self, records: Vec<Record>) -> Vec<Record> {
        if self.is_blank() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
