//! IndexedStore - native per-table rows with declared secondary indexes.

use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::{check_index, Record, RecordStore, StorageError, Versioned};

const DUMP_EXTENSION: &str = "bin";

/// Internal stored representation of a record.
#[derive(Clone)]
struct Row {
    seq: u64,
    version: u64,
    bytes: Vec<u8>,
    index_entries: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct IndexedTable {
    rows: HashMap<String, Row>,
    next_seq: u64,
    /// field -> value -> keys
    indexes: HashMap<String, HashMap<String, BTreeSet<String>>>,
    /// Indexes are rebuilt lazily after loading a dump, on first typed access.
    indexed: bool,
}

impl IndexedTable {
    fn ensure_indexes<M: Record>(&mut self) -> Result<(), StorageError> {
        if self.indexed {
            return Ok(());
        }
        self.indexes.clear();
        let keys: Vec<String> = self.rows.keys().cloned().collect();
        for key in keys {
            let entries = {
                let row = &self.rows[&key];
                let data: M = serde_json::from_slice(&row.bytes)?;
                index_entries(&data)
            };
            self.link(&key, &entries);
            if let Some(row) = self.rows.get_mut(&key) {
                row.index_entries = entries;
            }
        }
        self.indexed = true;
        Ok(())
    }

    fn link(&mut self, key: &str, entries: &[(String, String)]) {
        for (field, value) in entries {
            self.indexes
                .entry(field.clone())
                .or_default()
                .entry(value.clone())
                .or_default()
                .insert(key.to_string());
        }
    }

    fn unlink(&mut self, key: &str, entries: &[(String, String)]) {
        for (field, value) in entries {
            if let Some(values) = self.indexes.get_mut(field) {
                if let Some(keys) = values.get_mut(value) {
                    keys.remove(key);
                    if keys.is_empty() {
                        values.remove(value);
                    }
                }
            }
        }
    }

    fn write_row(&mut self, key: String, bytes: Vec<u8>, entries: Vec<(String, String)>) -> u64 {
        let (seq, version) = match self.rows.remove(&key) {
            Some(old) => {
                self.unlink(&key, &old.index_entries);
                (old.seq, old.version + 1)
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                (seq, 1)
            }
        };
        self.link(&key, &entries);
        self.rows.insert(
            key,
            Row {
                seq,
                version,
                bytes,
                index_entries: entries,
            },
        );
        version
    }

    fn dump(&self) -> TableDump {
        let mut rows: Vec<RowDump> = self
            .rows
            .iter()
            .map(|(key, row)| RowDump {
                key: key.clone(),
                seq: row.seq,
                version: row.version,
                bytes: row.bytes.clone(),
            })
            .collect();
        rows.sort_by_key(|r| r.seq);
        TableDump {
            next_seq: self.next_seq,
            rows,
        }
    }

    fn from_dump(dump: TableDump) -> Self {
        let rows = dump
            .rows
            .into_iter()
            .map(|r| {
                (
                    r.key,
                    Row {
                        seq: r.seq,
                        version: r.version,
                        bytes: r.bytes,
                        index_entries: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            rows,
            next_seq: dump.next_seq,
            indexes: HashMap::new(),
            indexed: false,
        }
    }
}

/// On-disk image of one table.
#[derive(Serialize, Deserialize)]
struct TableDump {
    next_seq: u64,
    rows: Vec<RowDump>,
}

#[derive(Serialize, Deserialize)]
struct RowDump {
    key: String,
    seq: u64,
    version: u64,
    bytes: Vec<u8>,
}

fn index_entries<M: Record>(record: &M) -> Vec<(String, String)> {
    M::INDEXES
        .iter()
        .filter_map(|field| {
            record
                .index_value(field)
                .map(|value| (field.to_string(), value))
        })
        .collect()
}

/// Structured backend with per-table storage and declared indexes.
///
/// Records are kept as JSON bytes keyed by primary key. Index lookups hit the
/// in-memory secondary index instead of scanning. With a directory, every
/// write rewrites `<dir>/<table>.bin` (bitcode) before returning, and `open`
/// reloads those dumps. Clone-friendly via Arc.
#[derive(Clone)]
pub struct IndexedStore {
    tables: Arc<RwLock<HashMap<String, IndexedTable>>>,
    dir: Option<PathBuf>,
}

impl Default for IndexedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedStore {
    /// Purely in-memory store.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            dir: None,
        }
    }

    /// Open a store persisted under `dir`, loading any existing table dumps.
    ///
    /// Fails if the directory cannot be created or a dump cannot be decoded.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut tables = HashMap::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DUMP_EXTENSION) {
                continue;
            }
            let Some(table) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = fs::read(&path)?;
            let dump: TableDump = bitcode::deserialize(&bytes).map_err(|e| {
                StorageError::Serde(format!("table dump {}: {}", path.display(), e))
            })?;
            tables.insert(table.to_string(), IndexedTable::from_dump(dump));
        }

        Ok(Self {
            tables: Arc::new(RwLock::new(tables)),
            dir: Some(dir),
        })
    }

    fn persist(&self, table_name: &str, table: &IndexedTable) -> Result<(), StorageError> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let bytes = bitcode::serialize(&table.dump())
            .map_err(|e| StorageError::Serde(e.to_string()))?;
        let path = dir.join(format!("{}.{}", table_name, DUMP_EXTENSION));
        let tmp = path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Read a table with its indexes built.
    fn with_table<M: Record, T>(
        &self,
        operation: &'static str,
        read: impl FnOnce(&IndexedTable) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned(operation))?;
        let table = tables.entry(M::TABLE.to_string()).or_default();
        table.ensure_indexes::<M>()?;
        read(table)
    }

    /// Apply a write. With a directory the change is made on a copy of the
    /// table and only swapped in once its dump is on disk, so a failed
    /// persist leaves the live table untouched.
    fn write_table<M: Record, T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut IndexedTable) -> Result<(T, bool), StorageError>,
    ) -> Result<T, StorageError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned(operation))?;
        let table = tables.entry(M::TABLE.to_string()).or_default();
        table.ensure_indexes::<M>()?;
        if self.dir.is_none() {
            return apply(table).map(|(result, _)| result);
        }
        let mut staged = table.clone();
        let (result, dirty) = apply(&mut staged)?;
        if dirty {
            self.persist(M::TABLE, &staged)?;
            *table = staged;
        }
        Ok(result)
    }

    fn decode<M: Record>(row: &Row) -> Result<Versioned<M>, StorageError> {
        Ok(Versioned {
            data: serde_json::from_slice(&row.bytes)?,
            version: row.version,
        })
    }
}

impl RecordStore for IndexedStore {
    fn get<M: Record>(&self, key: &str) -> Result<Option<Versioned<M>>, StorageError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("get"))?;
        tables
            .get(M::TABLE)
            .and_then(|t| t.rows.get(key))
            .map(|row| Self::decode::<M>(row))
            .transpose()
    }

    fn get_all<M: Record>(&self) -> Result<Vec<Versioned<M>>, StorageError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("get_all"))?;
        let Some(table) = tables.get(M::TABLE) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<&Row> = table.rows.values().collect();
        rows.sort_by_key(|r| r.seq);
        rows.into_iter().map(|row| Self::decode::<M>(row)).collect()
    }

    fn get_all_by_index<M: Record>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Versioned<M>>, StorageError> {
        check_index::<M>(field)?;
        self.with_table::<M, _>("get_all_by_index", |table| {
            let mut rows: Vec<&Row> = table
                .indexes
                .get(field)
                .and_then(|values| values.get(value))
                .map(|keys| keys.iter().filter_map(|k| table.rows.get(k)).collect())
                .unwrap_or_default();
            rows.sort_by_key(|r| r.seq);
            rows.into_iter().map(|row| Self::decode::<M>(row)).collect()
        })
    }

    fn put<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        let bytes = serde_json::to_vec(record)?;
        let entries = index_entries(record);
        let version = self.write_table::<M, _>("put", |table| {
            Ok((table.write_row(record.key(), bytes, entries), true))
        })?;
        Ok(Versioned {
            data: record.clone(),
            version,
        })
    }

    fn insert<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        let key = record.key();
        let bytes = serde_json::to_vec(record)?;
        let entries = index_entries(record);
        let version = self.write_table::<M, _>("insert", |table| {
            if table.rows.contains_key(&key) {
                return Err(StorageError::AlreadyExists {
                    table: M::TABLE.to_string(),
                    key: key.clone(),
                });
            }
            Ok((table.write_row(key.clone(), bytes, entries), true))
        })?;
        Ok(Versioned {
            data: record.clone(),
            version,
        })
    }

    fn update<M: Record>(
        &self,
        record: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, StorageError> {
        let key = record.key();
        let bytes = serde_json::to_vec(record)?;
        let entries = index_entries(record);
        let version = self.write_table::<M, _>("update", |table| {
            let actual = table
                .rows
                .get(&key)
                .map(|r| r.version)
                .ok_or_else(|| StorageError::NotFound {
                    table: M::TABLE.to_string(),
                    key: key.clone(),
                })?;
            if actual != expected_version {
                return Err(StorageError::ConcurrencyConflict {
                    table: M::TABLE.to_string(),
                    key: key.clone(),
                    expected: expected_version,
                    actual,
                });
            }
            Ok((table.write_row(key.clone(), bytes, entries), true))
        })?;
        Ok(Versioned {
            data: record.clone(),
            version,
        })
    }

    fn delete<M: Record>(&self, key: &str) -> Result<bool, StorageError> {
        self.write_table::<M, _>("delete", |table| match table.rows.remove(key) {
            Some(row) => {
                table.unlink(key, &row.index_entries);
                Ok((true, true))
            }
            None => Ok((false, false)),
        })
    }

    fn clear<M: Record>(&self) -> Result<(), StorageError> {
        self.write_table::<M, _>("clear", |table| {
            table.rows.clear();
            table.indexes.clear();
            Ok(((), true))
        })
    }
}
