use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;
use crate::model::Account;

/// A cart line: the account as it looked when added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub account: Account,
    /// Unique per cart entry.
    pub cart_id: String,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub(crate) fn snapshot(account: &Account) -> Self {
        Self {
            account: account.clone(),
            cart_id: ids::new_id(),
            quantity: 1,
            added_at: ids::now(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account.id
    }

    pub fn title(&self) -> &str {
        &self.account.title
    }

    pub fn line_total(&self) -> f64 {
        self.account.price * f64::from(self.quantity)
    }

    /// Seller reference recorded on transactions: the seller's user id when
    /// the listing has one, else the display name.
    pub(crate) fn seller_ref(&self) -> &str {
        self.account
            .seller_id
            .as_deref()
            .unwrap_or(&self.account.seller)
    }
}
