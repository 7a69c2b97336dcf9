use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids;
use crate::Record;

pub const DEFAULT_PAYMENT_METHOD: &str = "pix";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => f.write_str("pending"),
            TransactionStatus::Completed => f.write_str("completed"),
            TransactionStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Record of a purchase of one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[record(table = "transactions")]
pub struct Transaction {
    pub id: String,
    #[record(index)]
    pub account_id: String,
    #[record(index)]
    pub buyer_id: String,
    /// Seller display name, or seller id when the listing carries one.
    #[record(index)]
    pub seller_id: String,
    pub amount: f64,
    pub payment_method: String,
    #[serde(default)]
    pub buyer_email: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub account_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub buyer_email: Option<String>,
    #[serde(default)]
    pub buyer_phone: Option<String>,
    #[serde(default)]
    pub buyer_name: Option<String>,
}

impl NewTransaction {
    pub(crate) fn into_transaction(self) -> Transaction {
        Transaction {
            id: ids::new_id(),
            account_id: self.account_id,
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            amount: self.amount,
            payment_method: self
                .payment_method
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            buyer_email: self.buyer_email,
            buyer_phone: self.buyer_phone,
            buyer_name: self.buyer_name,
            status: TransactionStatus::Pending,
            created_at: ids::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pending_pix() {
        let tx = NewTransaction {
            account_id: "a1".into(),
            buyer_id: "b1".into(),
            seller_id: "s1".into(),
            amount: 50.0,
            payment_method: None,
            buyer_email: None,
            buyer_phone: None,
            buyer_name: None,
        }
        .into_transaction();
        assert_eq!(tx.payment_method, "pix");
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.index_value("buyer_id").as_deref(), Some("b1"));
    }
}
