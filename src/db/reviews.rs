use crate::error::MarketError;
use crate::model::{NewReview, Review};
use crate::storage::{RecordStore, RecordsExt};

use super::MarketDb;

impl<S: RecordStore> MarketDb<S> {
    /// Store a review. Rating aggregation is a read-time concern
    /// (see [`crate::model::average_rating`]).
    pub fn add_review(&self, data: NewReview) -> Result<Review, MarketError> {
        data.validate()?;
        if self.get_account(&data.account_id)?.is_none() {
            return Err(MarketError::NotFound {
                table: "accounts",
                id: data.account_id,
            });
        }
        let stored = self.store.table::<Review>().insert(&data.into_review())?;
        tracing::info!(
            review_id = %stored.data.id,
            account_id = %stored.data.account_id,
            rating = stored.data.rating,
            "Review added"
        );
        Ok(stored.data)
    }

    pub fn get_account_reviews(&self, account_id: &str) -> Result<Vec<Review>, MarketError> {
        Ok(self
            .store
            .table::<Review>()
            .by_index("account_id", account_id)?
            .into_iter()
            .map(|v| v.data)
            .collect())
    }

    pub fn mark_review_helpful(&self, review_id: &str) -> Result<Option<Review>, MarketError> {
        self.modify::<Review, _>(review_id, |r| r.helpful += 1)
    }
}
