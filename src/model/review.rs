use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids;
use crate::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[record(table = "reviews")]
pub struct Review {
    pub id: String,
    #[record(index)]
    pub account_id: String,
    #[record(index)]
    pub user_id: String,
    pub rating: u8,
    pub comment: String,
    pub helpful: u64,
    pub reported: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub account_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if !(1..=5).contains(&self.rating) {
            errors.push("rating", "must be between 1 and 5");
        }
        if self.account_id.is_empty() {
            errors.push("account_id", "is required");
        }
        if self.user_id.is_empty() {
            errors.push("user_id", "is required");
        }
        errors.into_result()
    }

    pub(crate) fn into_review(self) -> Review {
        Review {
            id: ids::new_id(),
            account_id: self.account_id,
            user_id: self.user_id,
            rating: self.rating,
            comment: self.comment,
            helpful: 0,
            reported: false,
            created_at: ids::now(),
        }
    }
}

/// Mean rating, or `None` for no reviews.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: u64 = reviews.iter().map(|r| u64::from(r.rating)).sum();
    Some(sum as f64 / reviews.len() as f64)
}
