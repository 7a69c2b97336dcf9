//! RecordStore - the storage adapter contract.

use super::{Record, StorageError, Versioned};

/// Abstract keyed storage shared by every table.
///
/// Both backends must behave identically: same ordering (insertion order),
/// same versioning, same errors. Every write is durable when the call returns.
pub trait RecordStore: Send + Sync {
    /// Get a record by key. Returns None if not found.
    fn get<M: Record>(&self, key: &str) -> Result<Option<Versioned<M>>, StorageError>;

    /// All records of a table in insertion order.
    fn get_all<M: Record>(&self) -> Result<Vec<Versioned<M>>, StorageError>;

    /// Records whose indexed `field` equals `value`, in insertion order.
    fn get_all_by_index<M: Record>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Versioned<M>>, StorageError>;

    /// Upsert a record (insert or replace, no version check).
    fn put<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError>;

    /// Insert a new record. Fails if the key already exists.
    fn insert<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError>;

    /// Replace an existing record if its stored version is `expected_version`.
    fn update<M: Record>(
        &self,
        record: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, StorageError>;

    /// Delete a record by key. Returns true if it existed.
    fn delete<M: Record>(&self, key: &str) -> Result<bool, StorageError>;

    /// Remove every record of a table.
    fn clear<M: Record>(&self) -> Result<(), StorageError>;

    /// Records matching a predicate (linear scan).
    fn find<M: Record>(
        &self,
        predicate: &dyn Fn(&M) -> bool,
    ) -> Result<Vec<Versioned<M>>, StorageError> {
        Ok(self
            .get_all::<M>()?
            .into_iter()
            .filter(|v| predicate(&v.data))
            .collect())
    }
}
