use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

/// One rejected field of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Malformed or out-of-range entity fields. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.push(field, message);
        err
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True if any error concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when no errors were collected.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, err) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} {}", sep, err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A cart line that can no longer be sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableItem {
    pub account_id: String,
    pub title: String,
}

fn list_unavailable(items: &[UnavailableItem]) -> String {
    items
        .iter()
        .map(|i| format!("{} ({})", i.title, i.account_id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors surfaced by the persistence and cart services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unique-constraint violation on user email or username.
    #[error("{field} already registered: {value}")]
    Duplicate { field: &'static str, value: String },

    /// An operation that must act on an existing record found none.
    #[error("{table} not found: {id}")]
    NotFound { table: &'static str, id: String },

    /// Items became unsellable between cart-add and checkout.
    #[error("no longer available: {}", list_unavailable(.items))]
    Availability { items: Vec<UnavailableItem> },

    /// A record changed underneath a guarded write.
    #[error("write conflict on {table}:{key} (expected version {expected}, found {actual})")]
    Conflict {
        table: String,
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error(transparent)]
    Storage(StorageError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<StorageError> for MarketError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConcurrencyConflict {
                table,
                key,
                expected,
                actual,
            } => MarketError::Conflict {
                table,
                key,
                expected,
                actual,
            },
            other => MarketError::Storage(other),
        }
    }
}

impl MarketError {
    pub(crate) fn unavailable(account_id: impl Into<String>, title: impl Into<String>) -> Self {
        MarketError::Availability {
            items: vec![UnavailableItem {
                account_id: account_id.into(),
                title: title.into(),
            }],
        }
    }
}
