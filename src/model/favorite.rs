use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Record;

/// A user's bookmark on an account. At most one per (user, account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[record(table = "favorites")]
pub struct Favorite {
    #[record(key, index)]
    pub user_id: String,
    #[record(key)]
    pub account_id: String,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn key_for(user_id: &str, account_id: &str) -> String {
        format!("{}:{}", user_id, account_id)
    }
}
