use crate::error::MarketError;
use crate::ids;
use crate::model::{Account, AccountPatch, AccountStatus, Game, NewAccount, SaleInfo};
use crate::query::AccountFilter;
use crate::storage::{RecordStore, RecordsExt};

use super::MarketDb;

impl<S: RecordStore> MarketDb<S> {
    /// Validate and store a new listing.
    pub fn add_account(&self, data: NewAccount) -> Result<Account, MarketError> {
        data.validate()?;
        let account = data.into_account();
        let stored = self.store.table::<Account>().insert(&account)?;
        tracing::info!(
            account_id = %stored.data.id,
            game = %stored.data.game,
            price = stored.data.price,
            "Account listed"
        );
        Ok(stored.data)
    }

    /// Plain lookup. Does not count as a view; see [`MarketDb::record_view`].
    pub fn get_account(&self, id: &str) -> Result<Option<Account>, MarketError> {
        Ok(self.store.table::<Account>().get(id)?.map(|v| v.data))
    }

    /// Count one view of a listing.
    pub fn record_view(&self, id: &str) -> Result<Option<Account>, MarketError> {
        self.modify::<Account, _>(id, |a| a.views += 1)
    }

    /// Accounts matching `filter`, in listing order. Sorting is left to the
    /// caller (see [`crate::query::sort_accounts`]).
    pub fn get_all_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>, MarketError> {
        let table = self.store.table::<Account>();
        let candidates = match filter.status {
            Some(status) => table.by_index("status", &status.to_string())?,
            None => table.all()?,
        };
        let accounts: Vec<Account> = candidates
            .into_iter()
            .map(|v| v.data)
            .filter(|a| filter.matches(a))
            .collect();
        tracing::debug!(count = accounts.len(), "Account query");
        Ok(accounts)
    }

    /// Up to `limit` available accounts of one game.
    pub fn get_accounts_by_game(&self, game: &Game, limit: usize) -> Result<Vec<Account>, MarketError> {
        Ok(self
            .store
            .table::<Account>()
            .by_index("game", game.code())?
            .into_iter()
            .map(|v| v.data)
            .filter(Account::is_available)
            .take(limit)
            .collect())
    }

    /// Every listing of a seller, whatever its status.
    pub fn get_seller_accounts(&self, seller: &str) -> Result<Vec<Account>, MarketError> {
        Ok(self
            .store
            .table::<Account>()
            .by_index("seller", seller)?
            .into_iter()
            .map(|v| v.data)
            .collect())
    }

    /// Merge `patch` into an account. `None` when the id is unknown.
    pub fn update_account(&self, id: &str, patch: AccountPatch) -> Result<Option<Account>, MarketError> {
        let updated = self.modify::<Account, _>(id, |a| patch.clone().apply(a))?;
        if let Some(account) = &updated {
            tracing::info!(account_id = %account.id, status = %account.status, "Account updated");
        }
        Ok(updated)
    }

    pub fn delete_account(&self, id: &str) -> Result<bool, MarketError> {
        let deleted = self.store.table::<Account>().delete(id)?;
        if deleted {
            tracing::info!(account_id = id, "Account deleted");
        }
        Ok(deleted)
    }

    /// Sell an account that is still available. The write is guarded by the
    /// version just read, so a concurrent sale surfaces as a conflict.
    pub(crate) fn mark_sold(&self, id: &str, title: &str, sale: SaleInfo) -> Result<Account, MarketError> {
        let current = match self.store.get::<Account>(id)? {
            Some(current) if current.data.is_available() => current,
            _ => return Err(MarketError::unavailable(id, title)),
        };
        let mut account = current.data;
        account.status = AccountStatus::Sold;
        account.sale = Some(sale);
        account.updated_at = ids::now();
        let stored = self.store.update(&account, current.version)?;
        tracing::info!(account_id = id, "Account sold");
        Ok(stored.data)
    }

    /// Reverse [`MarketDb::mark_sold`] if the account still carries the sale
    /// stamp of `transaction_id`.
    pub(crate) fn reopen_sale(&self, id: &str, transaction_id: &str) -> Result<(), MarketError> {
        self.modify::<Account, _>(id, |a| {
            let ours = a
                .sale
                .as_ref()
                .is_some_and(|s| s.transaction_id == transaction_id);
            if ours {
                a.status = AccountStatus::Available;
                a.sale = None;
                a.updated_at = ids::now();
            }
        })?;
        Ok(())
    }

    /// Status of the live record, `None` if it no longer exists.
    pub(crate) fn account_status(&self, id: &str) -> Result<Option<AccountStatus>, MarketError> {
        Ok(self.get_account(id)?.map(|a| a.status))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::listing;
    use super::*;
    use crate::storage::StorageBackend;

    #[test]
    fn add_sets_generated_fields() {
        let db = MarketDb::new(StorageBackend::in_memory());
        let account = db.add_account(listing(Game::Valorant, "Radiant account", 850.0)).unwrap();
        assert_eq!(account.status, AccountStatus::Available);
        assert_eq!(account.views, 0);
        assert_eq!(account.favorites_count, 0);
        assert!(!account.verified);
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn get_does_not_count_views() {
        let db = MarketDb::new(StorageBackend::in_memory());
        let account = db.add_account(listing(Game::Valorant, "Radiant account", 850.0)).unwrap();
        db.get_account(&account.id).unwrap();
        db.get_account(&account.id).unwrap();
        assert_eq!(db.get_account(&account.id).unwrap().unwrap().views, 0);
        assert_eq!(db.record_view(&account.id).unwrap().unwrap().views, 1);
    }

    #[test]
    fn by_game_respects_limit_and_status() {
        let db = MarketDb::new(StorageBackend::in_memory());
        for i in 0..3 {
            db.add_account(listing(Game::Diablo, &format!("Diablo IV level {}", 90 + i), 60.0))
                .unwrap();
        }
        let first = db.get_accounts_by_game(&Game::Diablo, 10).unwrap()[0].id.clone();
        db.update_account(&first, AccountPatch::status(AccountStatus::Sold)).unwrap();

        assert_eq!(db.get_accounts_by_game(&Game::Diablo, 10).unwrap().len(), 2);
        assert_eq!(db.get_accounts_by_game(&Game::Diablo, 1).unwrap().len(), 1);
    }

    #[test]
    fn update_unknown_id_is_none() {
        let db = MarketDb::new(StorageBackend::in_memory());
        assert!(db.update_account("nope", AccountPatch::default()).unwrap().is_none());
        assert!(!db.delete_account("nope").unwrap());
    }
}
