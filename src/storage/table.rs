//! Table - typed accessor for one record type.

use std::marker::PhantomData;

use super::{Record, RecordStore, StorageError, Versioned};

/// Typed wrapper around a [`RecordStore`] for a single table.
pub struct Table<'a, S, M> {
    store: &'a S,
    _marker: PhantomData<M>,
}

impl<'a, S: RecordStore, M: Record> Table<'a, S, M> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<Versioned<M>>, StorageError> {
        self.store.get(key)
    }

    pub fn all(&self) -> Result<Vec<Versioned<M>>, StorageError> {
        self.store.get_all()
    }

    pub fn by_index(&self, field: &str, value: &str) -> Result<Vec<Versioned<M>>, StorageError> {
        self.store.get_all_by_index(field, value)
    }

    pub fn put(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        self.store.put(record)
    }

    pub fn insert(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        self.store.insert(record)
    }

    pub fn update(&self, record: &M, expected_version: u64) -> Result<Versioned<M>, StorageError> {
        self.store.update(record, expected_version)
    }

    pub fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.store.delete::<M>(key)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.clear::<M>()
    }

    pub fn find(&self, predicate: &dyn Fn(&M) -> bool) -> Result<Vec<Versioned<M>>, StorageError> {
        self.store.find(predicate)
    }

    /// Unwrapped records, dropping versions.
    pub fn values(&self) -> Result<Vec<M>, StorageError> {
        Ok(self.all()?.into_iter().map(|v| v.data).collect())
    }
}

/// Extension trait for typed table access on any RecordStore.
pub trait RecordsExt: RecordStore + Sized {
    fn table<M: Record>(&self) -> Table<'_, Self, M> {
        Table::new(self)
    }
}

impl<S: RecordStore> RecordsExt for S {}
