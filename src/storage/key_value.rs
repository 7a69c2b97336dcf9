//! Key-value substrate: string values under string keys, like browser local storage.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::StorageError;

/// Minimal string key-value store. Writes are durable when the call returns.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Returns true if it existed.
    fn remove_item(&self, key: &str) -> Result<bool, StorageError>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

/// In-memory key-value storage. Clone-friendly via Arc; clones share data.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .read()
            .map_err(|_| StorageError::LockPoisoned("get_item"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::LockPoisoned("set_item"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::LockPoisoned("remove_item"))?;
        Ok(items.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let items = self
            .items
            .read()
            .map_err(|_| StorageError::LockPoisoned("keys"))?;
        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// File-per-key storage under a directory.
///
/// File names are the URL-safe base64 of the key, so any key round-trips.
/// Values are written to a temporary file, synced, then renamed into place.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

const ITEM_EXTENSION: &str = "item";

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.dir.join(format!("{}.{}", name, ITEM_EXTENSION))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ITEM_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(bytes) = URL_SAFE_NO_PAD.decode(stem) {
                if let Ok(key) = String::from_utf8(bytes) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("game_market_kv_{}_{}", name, uuid::Uuid::now_v7()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn memory_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get_item("cart").unwrap().is_none());

        storage.set_item("cart", "[]").unwrap();
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[]"));

        assert!(storage.remove_item("cart").unwrap());
        assert!(!storage.remove_item("cart").unwrap());
    }

    #[test]
    fn memory_clone_shares_items() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        storage.set_item("users", "[]").unwrap();
        assert_eq!(clone.keys().unwrap(), vec!["users".to_string()]);
    }

    #[test]
    fn file_storage_round_trips_awkward_keys() {
        let dir = temp_dir("keys");
        let storage = FileStorage::open(&dir).unwrap();

        storage.set_item("return/url?x=1", "checkout").unwrap();
        storage.set_item("accounts", "[]").unwrap();

        assert_eq!(
            storage.keys().unwrap(),
            vec!["accounts".to_string(), "return/url?x=1".to_string()]
        );
        assert_eq!(
            storage.get_item("return/url?x=1").unwrap().as_deref(),
            Some("checkout")
        );

        let reopened = FileStorage::open(&dir).unwrap();
        assert_eq!(reopened.get_item("accounts").unwrap().as_deref(), Some("[]"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = temp_dir("missing");
        let storage = FileStorage::open(&dir).unwrap();
        assert!(storage.get_item("nope").unwrap().is_none());
        assert!(!storage.remove_item("nope").unwrap());
        fs::remove_dir_all(dir).unwrap();
    }
}
