//! Backend selection: indexed when it opens, flat otherwise.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    FlatStore, IndexedStore, KeyValueStorage, MemoryStorage, Record, RecordStore, StorageError,
    Versioned,
};

/// Which backend to try first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Indexed,
    Flat,
}

/// The storage backend chosen at startup.
///
/// Callers see no behavioural difference between the variants.
#[derive(Clone)]
pub enum StorageBackend {
    Indexed(IndexedStore),
    Flat(FlatStore<Arc<dyn KeyValueStorage>>),
}

impl StorageBackend {
    /// Open the preferred backend.
    ///
    /// The indexed backend lives under `<data_dir>/indexed` when a directory is
    /// given and in memory otherwise. If it fails to open, the flat backend over
    /// `local` is used instead and the failure is only logged.
    pub fn open(
        kind: BackendKind,
        data_dir: Option<&Path>,
        local: Arc<dyn KeyValueStorage>,
    ) -> Self {
        match kind {
            BackendKind::Flat => StorageBackend::Flat(FlatStore::new(local)),
            BackendKind::Indexed => {
                let opened = match data_dir {
                    Some(dir) => IndexedStore::open(dir.join("indexed")),
                    None => Ok(IndexedStore::new()),
                };
                match opened {
                    Ok(store) => {
                        tracing::debug!(?data_dir, "Indexed storage backend ready");
                        StorageBackend::Indexed(store)
                    }
                    Err(error) => {
                        tracing::warn!(%error, "Indexed storage unavailable, using flat storage");
                        StorageBackend::Flat(FlatStore::new(local))
                    }
                }
            }
        }
    }

    /// Fresh in-memory indexed backend.
    pub fn in_memory() -> Self {
        StorageBackend::Indexed(IndexedStore::new())
    }

    /// Fresh in-memory flat backend.
    pub fn in_memory_flat() -> Self {
        let local: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        StorageBackend::Flat(FlatStore::new(local))
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            StorageBackend::Indexed(_) => BackendKind::Indexed,
            StorageBackend::Flat(_) => BackendKind::Flat,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            StorageBackend::Indexed($store) => $call,
            StorageBackend::Flat($store) => $call,
        }
    };
}

impl RecordStore for StorageBackend {
    fn get<M: Record>(&self, key: &str) -> Result<Option<Versioned<M>>, StorageError> {
        delegate!(self, s => s.get(key))
    }

    fn get_all<M: Record>(&self) -> Result<Vec<Versioned<M>>, StorageError> {
        delegate!(self, s => s.get_all())
    }

    fn get_all_by_index<M: Record>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Versioned<M>>, StorageError> {
        delegate!(self, s => s.get_all_by_index(field, value))
    }

    fn put<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        delegate!(self, s => s.put(record))
    }

    fn insert<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        delegate!(self, s => s.insert(record))
    }

    fn update<M: Record>(
        &self,
        record: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, StorageError> {
        delegate!(self, s => s.update(record, expected_version))
    }

    fn delete<M: Record>(&self, key: &str) -> Result<bool, StorageError> {
        delegate!(self, s => s.delete::<M>(key))
    }

    fn clear<M: Record>(&self) -> Result<(), StorageError> {
        delegate!(self, s => s.clear::<M>())
    }
}
