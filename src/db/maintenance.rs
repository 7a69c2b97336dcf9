use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::model::{
    Account, AccountStatus, Favorite, Message, Review, Transaction, TransactionStatus, User,
};
use crate::storage::{RecordStore, RecordsExt};

use super::sample;
use super::MarketDb;

/// Marketplace-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub total_accounts: usize,
    pub available_accounts: usize,
    pub total_users: usize,
    pub total_transactions: usize,
    /// Completed transactions only.
    pub total_sales: usize,
    /// Sum of completed transaction amounts.
    pub total_revenue: f64,
}

impl<S: RecordStore> MarketDb<S> {
    pub fn get_stats(&self) -> Result<MarketStats, MarketError> {
        let accounts = self.store.table::<Account>().values()?;
        let transactions = self.store.table::<Transaction>().values()?;
        let completed: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Completed)
            .collect();

        Ok(MarketStats {
            total_accounts: accounts.len(),
            available_accounts: accounts
                .iter()
                .filter(|a| a.status == AccountStatus::Available)
                .count(),
            total_users: self.store.table::<User>().all()?.len(),
            total_transactions: transactions.len(),
            total_sales: completed.len(),
            total_revenue: completed.iter().map(|t| t.amount).sum(),
        })
    }

    /// Insert the demo users and listings when there are no accounts yet.
    /// Entries that fail (duplicate user, invalid listing) are logged and
    /// skipped. Returns the number of accounts inserted.
    pub fn seed_sample_data(&self) -> Result<usize, MarketError> {
        if !self.store.table::<Account>().all()?.is_empty() {
            tracing::debug!("Sample data skipped: accounts present");
            return Ok(0);
        }

        for (user, patch) in sample::users() {
            match self.register_user(user) {
                Ok(profile) => {
                    self.update_user(&profile.id, patch)?;
                }
                Err(e) => tracing::warn!(error = %e, "Sample user skipped"),
            }
        }

        let mut inserted = 0;
        for account in sample::accounts() {
            match self.add_account(account) {
                Ok(_) => inserted += 1,
                Err(e) => tracing::warn!(error = %e, "Sample account skipped"),
            }
        }
        tracing::info!(accounts = inserted, "Sample data seeded");
        Ok(inserted)
    }

    /// Empty every table.
    pub fn clear_all_data(&self) -> Result<(), MarketError> {
        self.store.clear::<Account>()?;
        self.store.clear::<User>()?;
        self.store.clear::<Transaction>()?;
        self.store.clear::<Review>()?;
        self.store.clear::<Favorite>()?;
        self.store.clear::<Message>()?;
        tracing::info!("All tables cleared");
        Ok(())
    }
}
