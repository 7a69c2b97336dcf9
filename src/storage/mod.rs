//! Storage Adapter - keyed, versioned record storage behind one interface.
//!
//! Every logical table (accounts, users, favorites, ...) is a collection of
//! [`Record`]s addressed by key. Two interchangeable backends implement
//! [`RecordStore`]:
//!
//! - [`FlatStore`]: each table is one serialized JSON array stored under the
//!   table name in a [`KeyValueStorage`] (the local-storage layout).
//! - [`IndexedStore`]: native per-table rows with declared secondary indexes,
//!   optionally dumped to disk after every write.
//!
//! [`StorageBackend::open`] picks one at startup and silently degrades to the
//! flat backend when the indexed backend cannot be opened.
//!
//! ## Example
//!
//! ```ignore
//! use game_market::{Record, RecordsExt, StorageBackend};
//!
//! #[derive(Clone, Serialize, Deserialize, Record)]
//! #[record(table = "reviews")]
//! struct Review {
//!     id: String,
//!     #[record(index)]
//!     account_id: String,
//! }
//!
//! let store = StorageBackend::in_memory();
//! store.table::<Review>().put(&review)?;
//! let for_account = store.table::<Review>().by_index("account_id", "acc-1")?;
//! ```

mod backend;
mod flat;
mod indexed;
mod key_value;
mod store;
mod table;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Trait for types that live in a storage table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Table name ("accounts", "users", ...). Also the storage key of the
    /// serialized collection in the flat backend.
    const TABLE: &'static str;

    /// Secondary indexes declared for this table.
    const INDEXES: &'static [&'static str];

    /// Primary key. Composite keys are joined with `:`.
    fn key(&self) -> String;

    /// Value of an indexed field, or `None` if `field` is not an index.
    fn index_value(&self, field: &str) -> Option<String>;
}

/// A record together with its storage version.
///
/// Versions start at 1 and grow by one on every write of the same key.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on {table}:{key} (expected version {expected}, actual {actual})")]
    ConcurrencyConflict {
        table: String,
        key: String,
        expected: u64,
        actual: u64,
    },
    /// Insert of a key that already exists.
    #[error("record already exists: {table}:{key}")]
    AlreadyExists { table: String, key: String },
    /// Update of a key that does not exist.
    #[error("record not found: {table}:{key}")]
    NotFound { table: String, key: String },
    /// Lookup on a field that is not a declared index.
    #[error("table {table} has no index on {field}")]
    UnknownIndex { table: String, field: String },
    /// Serialization/deserialization error.
    #[error("storage serialization error: {0}")]
    Serde(String),
    /// Filesystem error.
    #[error("storage io error: {0}")]
    Io(String),
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

pub(crate) fn check_index<M: Record>(field: &str) -> Result<(), StorageError> {
    if M::INDEXES.contains(&field) {
        Ok(())
    } else {
        Err(StorageError::UnknownIndex {
            table: M::TABLE.to_string(),
            field: field.to_string(),
        })
    }
}

pub use backend::{BackendKind, StorageBackend};
pub use flat::FlatStore;
pub use indexed::IndexedStore;
pub use key_value::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::RecordStore;
pub use table::{RecordsExt, Table};
