//! Persistence Service - typed CRUD and queries over a [`RecordStore`].
//!
//! `MarketDb` owns validation, generated fields and derived counters
//! (views, favorite counts, user purchase/sale stats). Lookups of a missing
//! id return `Ok(None)`; only operations whose caller must react surface
//! [`MarketError::NotFound`].
//!
//! Read-modify-write updates go through [`MarketDb::modify`], which reloads
//! and retries when another writer bumped the record version in between.
//!
//! ## Example
//!
//! ```ignore
//! use game_market::{MarketDb, StorageBackend, NewUser, AccountFilter};
//!
//! let db = MarketDb::new(StorageBackend::in_memory());
//! let seller = db.register_user(NewUser::new("ana", "ana@example.com", "pw"))?;
//! let account = db.add_account(listing)?;
//! let lol = db.get_all_accounts(&AccountFilter::default().game("lol"))?;
//! ```

mod accounts;
mod favorites;
mod maintenance;
mod messages;
mod reviews;
mod sample;
mod transactions;
mod users;

use std::sync::Mutex;

use crate::error::MarketError;
use crate::storage::{Record, RecordStore, StorageError};

pub use maintenance::MarketStats;

/// Attempts a guarded read-modify-write makes before giving up with
/// [`MarketError::Conflict`].
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

pub struct MarketDb<S> {
    store: S,
    /// Serializes the check-then-insert of user registration.
    registration: Mutex<()>,
}

impl<S: RecordStore> MarketDb<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            registration: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reload `key`, apply `change` and write it back guarded by the loaded
    /// version. Returns `None` when the record does not exist (or vanished
    /// between read and write).
    pub(crate) fn modify<M, F>(&self, key: &str, mut change: F) -> Result<Option<M>, MarketError>
    where
        M: Record,
        F: FnMut(&mut M),
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let Some(current) = self.store.get::<M>(key)? else {
                return Ok(None);
            };
            let mut record = current.data;
            change(&mut record);
            match self.store.update(&record, current.version) {
                Ok(stored) => return Ok(Some(stored.data)),
                Err(StorageError::NotFound { .. }) => return Ok(None),
                Err(StorageError::ConcurrencyConflict { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(table = M::TABLE, key, attempt, "Retrying conflicted write");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
