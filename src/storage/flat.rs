//! FlatStore - one serialized JSON array per table in a key-value store.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::{check_index, KeyValueStorage, Record, RecordStore, StorageError, Versioned};

/// One row of a flat table document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlatEntry {
    key: String,
    version: u64,
    record: serde_json::Value,
}

/// Flat-document backend.
///
/// Each table is stored as a JSON array under the table name, e.g. the
/// `accounts` key holds every account. Reads parse the whole array, writes
/// rewrite it. Writers are serialized by an internal mutex. Clones share the
/// mutex and the underlying storage.
#[derive(Clone)]
pub struct FlatStore<K> {
    storage: K,
    write_guard: Arc<Mutex<()>>,
}

impl<K: KeyValueStorage> FlatStore<K> {
    pub fn new(storage: K) -> Self {
        Self {
            storage,
            write_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Access the underlying key-value storage.
    pub fn storage(&self) -> &K {
        &self.storage
    }

    fn load(&self, table: &str) -> Result<Vec<FlatEntry>, StorageError> {
        match self.storage.get_item(table)? {
            Some(doc) => Ok(serde_json::from_str(&doc)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, table: &str, entries: &[FlatEntry]) -> Result<(), StorageError> {
        let doc = serde_json::to_string(entries)?;
        self.storage.set_item(table, &doc)
    }

    fn decode<M: Record>(entry: &FlatEntry) -> Result<Versioned<M>, StorageError> {
        let data: M = serde_json::from_value(entry.record.clone())?;
        Ok(Versioned {
            data,
            version: entry.version,
        })
    }

    fn write<M: Record, T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut Vec<FlatEntry>) -> Result<(T, bool), StorageError>,
    ) -> Result<T, StorageError> {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| StorageError::LockPoisoned(operation))?;
        let mut entries = self.load(M::TABLE)?;
        let (result, dirty) = apply(&mut entries)?;
        if dirty {
            self.save(M::TABLE, &entries)?;
        }
        Ok(result)
    }
}

impl<K: KeyValueStorage> RecordStore for FlatStore<K> {
    fn get<M: Record>(&self, key: &str) -> Result<Option<Versioned<M>>, StorageError> {
        let entries = self.load(M::TABLE)?;
        entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| Self::decode::<M>(e))
            .transpose()
    }

    fn get_all<M: Record>(&self) -> Result<Vec<Versioned<M>>, StorageError> {
        self.load(M::TABLE)?
            .iter()
            .map(|e| Self::decode::<M>(e))
            .collect()
    }

    fn get_all_by_index<M: Record>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Versioned<M>>, StorageError> {
        check_index::<M>(field)?;
        Ok(self
            .get_all::<M>()?
            .into_iter()
            .filter(|v| v.data.index_value(field).as_deref() == Some(value))
            .collect())
    }

    fn put<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        let key = record.key();
        let value = serde_json::to_value(record)?;
        let version = self.write::<M, _>("put", |entries| {
            let version = match entries.iter_mut().find(|e| e.key == key) {
                Some(entry) => {
                    entry.version += 1;
                    entry.record = value;
                    entry.version
                }
                None => {
                    entries.push(FlatEntry {
                        key: key.clone(),
                        version: 1,
                        record: value,
                    });
                    1
                }
            };
            Ok((version, true))
        })?;
        Ok(Versioned {
            data: record.clone(),
            version,
        })
    }

    fn insert<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        let key = record.key();
        let value = serde_json::to_value(record)?;
        self.write::<M, _>("insert", |entries| {
            if entries.iter().any(|e| e.key == key) {
                return Err(StorageError::AlreadyExists {
                    table: M::TABLE.to_string(),
                    key: key.clone(),
                });
            }
            entries.push(FlatEntry {
                key: key.clone(),
                version: 1,
                record: value,
            });
            Ok(((), true))
        })?;
        Ok(Versioned {
            data: record.clone(),
            version: 1,
        })
    }

    fn update<M: Record>(
        &self,
        record: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, StorageError> {
        let key = record.key();
        let value = serde_json::to_value(record)?;
        let version = self.write::<M, _>("update", |entries| {
            let entry = entries
                .iter_mut()
                .find(|e| e.key == key)
                .ok_or_else(|| StorageError::NotFound {
                    table: M::TABLE.to_string(),
                    key: key.clone(),
                })?;
            if entry.version != expected_version {
                return Err(StorageError::ConcurrencyConflict {
                    table: M::TABLE.to_string(),
                    key: key.clone(),
                    expected: expected_version,
                    actual: entry.version,
                });
            }
            entry.version += 1;
            entry.record = value;
            Ok((entry.version, true))
        })?;
        Ok(Versioned {
            data: record.clone(),
            version,
        })
    }

    fn delete<M: Record>(&self, key: &str) -> Result<bool, StorageError> {
        self.write::<M, _>("delete", |entries| {
            let before = entries.len();
            entries.retain(|e| e.key != key);
            let removed = entries.len() != before;
            Ok((removed, removed))
        })
    }

    fn clear<M: Record>(&self) -> Result<(), StorageError> {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| StorageError::LockPoisoned("clear"))?;
        self.storage.remove_item(M::TABLE)?;
        Ok(())
    }
}
