use crate::error::MarketError;
use crate::ids;
use crate::model::{Account, Favorite};
use crate::storage::{RecordStore, RecordsExt, StorageError};

use super::MarketDb;

impl<S: RecordStore> MarketDb<S> {
    /// Bookmark an account. Idempotent: favoriting twice succeeds and counts
    /// once. Returns whether a new favorite was created.
    pub fn add_favorite(&self, user_id: &str, account_id: &str) -> Result<bool, MarketError> {
        if self.get_account(account_id)?.is_none() {
            return Err(MarketError::NotFound {
                table: "accounts",
                id: account_id.to_string(),
            });
        }

        let favorite = Favorite {
            user_id: user_id.to_string(),
            account_id: account_id.to_string(),
            created_at: ids::now(),
        };
        match self.store.table::<Favorite>().insert(&favorite) {
            Ok(_) => {}
            Err(StorageError::AlreadyExists { .. }) => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        self.modify::<Account, _>(account_id, |a| a.favorites_count += 1)?;
        tracing::info!(user_id, account_id, "Favorite added");
        Ok(true)
    }

    /// Remove a bookmark. Removing one that does not exist is a no-op.
    /// Returns whether a favorite was removed.
    pub fn remove_favorite(&self, user_id: &str, account_id: &str) -> Result<bool, MarketError> {
        let removed = self
            .store
            .table::<Favorite>()
            .delete(&Favorite::key_for(user_id, account_id))?;
        if removed {
            self.modify::<Account, _>(account_id, |a| {
                a.favorites_count = a.favorites_count.saturating_sub(1)
            })?;
            tracing::info!(user_id, account_id, "Favorite removed");
        }
        Ok(removed)
    }

    pub fn is_favorite(&self, user_id: &str, account_id: &str) -> Result<bool, MarketError> {
        Ok(self
            .store
            .table::<Favorite>()
            .get(&Favorite::key_for(user_id, account_id))?
            .is_some())
    }

    /// Accounts a user has bookmarked. Favorites pointing at deleted
    /// accounts are skipped.
    pub fn get_user_favorites(&self, user_id: &str) -> Result<Vec<Account>, MarketError> {
        let favorites = self.store.table::<Favorite>().by_index("user_id", user_id)?;
        let mut accounts = Vec::with_capacity(favorites.len());
        for fav in favorites {
            if let Some(account) = self.get_account(&fav.data.account_id)? {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }
}
