use crate::error::MarketError;
use crate::model::{NewTransaction, Transaction, TransactionStatus};
use crate::storage::{RecordStore, RecordsExt};

use super::MarketDb;

impl<S: RecordStore> MarketDb<S> {
    /// Record a purchase attempt. Status starts as pending; payment method
    /// defaults to pix.
    pub fn create_transaction(&self, data: NewTransaction) -> Result<Transaction, MarketError> {
        let transaction = data.into_transaction();
        self.insert_transaction(&transaction)?;
        Ok(transaction)
    }

    pub fn get_transaction(&self, id: &str) -> Result<Option<Transaction>, MarketError> {
        Ok(self.store.table::<Transaction>().get(id)?.map(|v| v.data))
    }

    pub fn get_user_purchases(&self, buyer_id: &str) -> Result<Vec<Transaction>, MarketError> {
        self.transactions_by("buyer_id", buyer_id)
    }

    pub fn get_seller_sales(&self, seller_id: &str) -> Result<Vec<Transaction>, MarketError> {
        self.transactions_by("seller_id", seller_id)
    }

    /// Store a transaction built by the caller (checkout stamps its id on
    /// the account before storing it).
    pub(crate) fn insert_transaction(&self, transaction: &Transaction) -> Result<(), MarketError> {
        self.store.table::<Transaction>().insert(transaction)?;
        tracing::info!(
            transaction_id = %transaction.id,
            account_id = %transaction.account_id,
            amount = transaction.amount,
            "Transaction created"
        );
        Ok(())
    }

    pub(crate) fn set_transaction_status(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> Result<Option<Transaction>, MarketError> {
        self.modify::<Transaction, _>(id, |t| t.status = status)
    }

    fn transactions_by(&self, field: &str, value: &str) -> Result<Vec<Transaction>, MarketError> {
        Ok(self
            .store
            .table::<Transaction>()
            .by_index(field, value)?
            .into_iter()
            .map(|v| v.data)
            .collect())
    }
}
