use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::MarketDb;
use crate::error::{MarketError, UnavailableItem, ValidationError};
use crate::ids;
use crate::model::{
    AccountStatus, NewTransaction, SaleInfo, Transaction, TransactionStatus, UserProfile,
};
use crate::session::Session;
use crate::storage::RecordStore;

use super::{Cart, CartItem, CartSummary};

/// Return marker stored when checkout needs a login first.
pub const CHECKOUT_RETURN_TO: &str = "checkout";

/// How a multi-item checkout behaves when an item cannot be sold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPolicy {
    /// Verify every item first and write nothing if any is unavailable, then
    /// commit item by item; a write conflict undoes the items already sold.
    #[default]
    TwoPhase,
    /// Verify and commit one item at a time. The first unavailable item stops
    /// the checkout; items sold before it stay sold.
    Sequential,
}

/// Buyer identity and contact details recorded on each transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<&UserProfile> for BuyerInfo {
    fn from(user: &UserProfile) -> Self {
        BuyerInfo {
            user_id: user.id.clone(),
            name: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

/// Where [`Cart::start_checkout`] leaves the buyer.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutGate {
    /// Nothing to buy.
    EmptyCart,
    /// No signed-in buyer. The return marker and the pending cart were saved.
    LoginRequired,
    /// Ready to collect payment details.
    Ready(CartSummary),
}

/// Aggregate result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    /// Human-readable order id, `GA-YYYYMMDD-XXXXXX`.
    pub order_id: String,
    pub transactions: Vec<Transaction>,
    /// Sum of transaction amounts.
    pub total: f64,
    pub fees: f64,
    pub total_with_fees: f64,
    pub placed_at: DateTime<Utc>,
    /// Plain-text order summary for the buyer to send to the seller.
    pub summary: String,
}

struct SoldItem {
    transaction: Transaction,
    seller: String,
    settled: Settled,
}

/// Writes of one sale that landed after the account was stamped sold.
#[derive(Default)]
struct Settled {
    transaction: bool,
    purchase: bool,
    sale: bool,
}

impl Cart {
    /// Gate the checkout view.
    ///
    /// Every line is checked against its live account first. Lines whose
    /// account is gone or no longer available are purged from the cart and
    /// reported in one [`MarketError::Availability`].
    pub fn start_checkout<S: RecordStore>(
        &mut self,
        db: &MarketDb<S>,
        session: &Session,
    ) -> Result<CheckoutGate, MarketError> {
        if self.is_empty() {
            tracing::warn!("Checkout attempted with an empty cart");
            return Ok(CheckoutGate::EmptyCart);
        }

        let mut unavailable = Vec::new();
        for item in &self.items {
            if db.account_status(item.account_id())? != Some(AccountStatus::Available) {
                unavailable.push(unavailable_item(item));
            }
        }
        if !unavailable.is_empty() {
            let items = self
                .items
                .iter()
                .filter(|i| !unavailable.iter().any(|u| u.account_id == i.account.id))
                .cloned()
                .collect();
            self.commit(items)?;
            tracing::warn!(removed = unavailable.len(), "Unavailable items purged from cart");
            return Err(MarketError::Availability { items: unavailable });
        }

        if !session.is_authenticated()? {
            session.set_return_to(CHECKOUT_RETURN_TO)?;
            session.stash_cart(&self.items)?;
            tracing::info!("Checkout needs login");
            return Ok(CheckoutGate::LoginRequired);
        }

        Ok(CheckoutGate::Ready(self.summary()))
    }

    /// Sell every line to `buyer` and clear the cart.
    ///
    /// Each line becomes a pending [`Transaction`] for price times quantity
    /// and its account is marked sold. Failure behaviour follows the
    /// configured [`CheckoutPolicy`].
    pub fn process_checkout<S: RecordStore>(
        &mut self,
        db: &MarketDb<S>,
        payment_method: &str,
        buyer: &BuyerInfo,
    ) -> Result<CheckoutReceipt, MarketError> {
        if self.is_empty() {
            return Err(ValidationError::single("cart", "is empty").into());
        }

        let sold = match self.config.policy {
            CheckoutPolicy::TwoPhase => self.commit_two_phase(db, payment_method, buyer)?,
            CheckoutPolicy::Sequential => self.commit_sequential(db, payment_method, buyer)?,
        };

        let receipt = self.receipt(sold.into_iter().map(|s| s.transaction).collect(), buyer);
        self.clear()?;
        tracing::info!(
            order_id = %receipt.order_id,
            items = receipt.transactions.len(),
            total = receipt.total,
            "Checkout completed"
        );
        Ok(receipt)
    }

    fn commit_two_phase<S: RecordStore>(
        &self,
        db: &MarketDb<S>,
        payment_method: &str,
        buyer: &BuyerInfo,
    ) -> Result<Vec<SoldItem>, MarketError> {
        let mut unavailable = Vec::new();
        for item in &self.items {
            if db.account_status(item.account_id())? != Some(AccountStatus::Available) {
                unavailable.push(unavailable_item(item));
            }
        }
        if !unavailable.is_empty() {
            tracing::warn!(unavailable = unavailable.len(), "Checkout rejected before any write");
            return Err(MarketError::Availability { items: unavailable });
        }

        let mut sold = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match sell(db, item, payment_method, buyer) {
                Ok(s) => sold.push(s),
                Err(err) => {
                    tracing::warn!(error = %err, compensated = sold.len(), "Checkout failed mid-commit");
                    compensate(db, &sold, buyer);
                    return Err(err);
                }
            }
        }
        Ok(sold)
    }

    fn commit_sequential<S: RecordStore>(
        &mut self,
        db: &MarketDb<S>,
        payment_method: &str,
        buyer: &BuyerInfo,
    ) -> Result<Vec<SoldItem>, MarketError> {
        let mut sold = Vec::with_capacity(self.items.len());
        let mut failure = None;
        for item in &self.items {
            match sell(db, item, payment_method, buyer) {
                Ok(s) => sold.push(s),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = failure {
            let sold_ids: Vec<&str> = sold.iter().map(|s| s.transaction.account_id.as_str()).collect();
            let items = self
                .items
                .iter()
                .filter(|i| !sold_ids.contains(&i.account_id()))
                .cloned()
                .collect();
            self.commit(items)?;
            tracing::warn!(
                error = %err,
                already_sold = sold_ids.len(),
                "Checkout stopped; earlier items stay sold"
            );
            return Err(err);
        }
        Ok(sold)
    }

    fn receipt(&self, transactions: Vec<Transaction>, buyer: &BuyerInfo) -> CheckoutReceipt {
        let placed_at = ids::now();
        let order_id = ids::order_number(placed_at);
        let total: f64 = transactions.iter().map(|t| t.amount).sum();
        let fees = super::pricing::fees(total, self.config.fee_rate);

        let mut summary = format!("Order {}\n\n", order_id);
        for item in &self.items {
            let _ = writeln!(
                summary,
                "- {} x{}: {:.2}",
                item.title(),
                item.quantity,
                item.line_total()
            );
        }
        let _ = writeln!(summary, "\nTotal: {:.2}", total);
        let _ = writeln!(summary, "Name: {}", buyer.name);
        let _ = writeln!(summary, "Email: {}", buyer.email);
        if let Some(phone) = &buyer.phone {
            let _ = writeln!(summary, "Phone: {}", phone);
        }

        CheckoutReceipt {
            order_id,
            transactions,
            total,
            fees,
            total_with_fees: total + fees,
            placed_at,
            summary,
        }
    }
}

fn unavailable_item(item: &CartItem) -> UnavailableItem {
    UnavailableItem {
        account_id: item.account_id().to_string(),
        title: item.title().to_string(),
    }
}

/// Sell one line: stamp the account sold under a version guard, then store
/// the transaction the stamp points at and update user stats. If any step
/// after the stamp fails, the steps taken so far are undone.
fn sell<S: RecordStore>(
    db: &MarketDb<S>,
    item: &CartItem,
    payment_method: &str,
    buyer: &BuyerInfo,
) -> Result<SoldItem, MarketError> {
    let transaction = NewTransaction {
        account_id: item.account_id().to_string(),
        buyer_id: buyer.user_id.clone(),
        seller_id: item.seller_ref().to_string(),
        amount: item.line_total(),
        payment_method: Some(payment_method.to_string()),
        buyer_email: Some(buyer.email.clone()),
        buyer_phone: buyer.phone.clone(),
        buyer_name: Some(buyer.name.clone()),
    }
    .into_transaction();

    db.mark_sold(
        item.account_id(),
        item.title(),
        SaleInfo {
            sold_at: ids::now(),
            transaction_id: transaction.id.clone(),
            buyer_id: buyer.user_id.clone(),
        },
    )?;

    let mut sold = SoldItem {
        transaction,
        seller: item.seller_ref().to_string(),
        settled: Settled::default(),
    };
    if let Err(err) = settle(db, &mut sold, buyer) {
        tracing::warn!(error = %err, account_id = item.account_id(), "Sale failed after stamping");
        compensate(db, std::slice::from_ref(&sold), buyer);
        return Err(err);
    }
    Ok(sold)
}

fn settle<S: RecordStore>(
    db: &MarketDb<S>,
    sold: &mut SoldItem,
    buyer: &BuyerInfo,
) -> Result<(), MarketError> {
    db.insert_transaction(&sold.transaction)?;
    sold.settled.transaction = true;
    db.record_purchase(&buyer.user_id, sold.transaction.amount)?;
    sold.settled.purchase = true;
    db.record_sale(&sold.seller)?;
    sold.settled.sale = true;
    Ok(())
}

fn undo_sale<S: RecordStore>(
    db: &MarketDb<S>,
    sold: &SoldItem,
    buyer: &BuyerInfo,
) -> Result<(), MarketError> {
    let tx = &sold.transaction;
    db.reopen_sale(&tx.account_id, &tx.id)?;
    if sold.settled.transaction {
        db.set_transaction_status(&tx.id, TransactionStatus::Cancelled)?;
    }
    if sold.settled.purchase {
        db.revert_purchase(&buyer.user_id, tx.amount)?;
    }
    if sold.settled.sale {
        db.revert_sale(&sold.seller)?;
    }
    Ok(())
}

/// Undo sales, newest first. Failures are logged; the original error is
/// what the caller sees.
fn compensate<S: RecordStore>(db: &MarketDb<S>, sold: &[SoldItem], buyer: &BuyerInfo) {
    for item in sold.iter().rev() {
        let tx = &item.transaction;
        match undo_sale(db, item, buyer) {
            Ok(()) => tracing::info!(account_id = %tx.account_id, transaction_id = %tx.id, "Sale compensated"),
            Err(error) => tracing::error!(%error, account_id = %tx.account_id, "Compensation failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cart::CartConfig;
    use crate::model::{Features, Game, NewAccount, NewUser};
    use crate::storage::{MemoryStorage, StorageBackend};

    fn listing(title: &str, price: f64) -> NewAccount {
        NewAccount {
            game: Game::Cod,
            title: title.into(),
            description: "Warzone ready account with every operator bundle since 2020.".into(),
            price,
            seller: "cod_vendor".into(),
            seller_id: None,
            features: Features::default(),
            images: Vec::new(),
        }
    }

    #[test]
    fn start_checkout_without_login_stashes_cart() {
        let db = MarketDb::new(StorageBackend::in_memory());
        let storage: Arc<dyn crate::storage::KeyValueStorage> = Arc::new(MemoryStorage::new());
        let session = Session::new(Arc::clone(&storage));
        let mut cart = Cart::load(storage, CartConfig::default()).unwrap();
        let account = db.add_account(listing("Call of Duty prestige", 70.0)).unwrap();
        cart.add_account(&account).unwrap();

        let gate = cart.start_checkout(&db, &session).unwrap();
        assert_eq!(gate, CheckoutGate::LoginRequired);
        assert_eq!(session.take_return_to().unwrap().as_deref(), Some(CHECKOUT_RETURN_TO));

        cart.clear().unwrap();
        assert_eq!(cart.restore_pending(&session).unwrap(), 1);
        assert!(cart.contains(&account.id));
    }

    #[test]
    fn receipt_summarises_order() {
        let db = MarketDb::new(StorageBackend::in_memory());
        let buyer = db.register_user(NewUser::new("bia", "bia@example.com", "pw")).unwrap();
        let mut cart = Cart::load(Arc::new(MemoryStorage::new()), CartConfig::default()).unwrap();
        let account = db.add_account(listing("Call of Duty prestige", 70.0)).unwrap();
        cart.add_account(&account).unwrap();

        let receipt = cart
            .process_checkout(&db, "card", &BuyerInfo::from(&buyer))
            .unwrap();
        assert!(receipt.order_id.starts_with("GA-"));
        assert!(receipt.summary.contains("Call of Duty prestige x1: 70.00"));
        assert!(receipt.summary.contains("Email: bia@example.com"));
        assert_eq!(receipt.total_with_fees, 73.5);
        assert_eq!(receipt.transactions[0].payment_method, "card");
    }

    #[test]
    fn empty_cart_cannot_be_processed() {
        let db = MarketDb::new(StorageBackend::in_memory());
        let mut cart = Cart::load(Arc::new(MemoryStorage::new()), CartConfig::default()).unwrap();
        let buyer = BuyerInfo {
            user_id: "b".into(),
            name: "b".into(),
            email: "b@example.com".into(),
            phone: None,
        };
        assert!(matches!(
            cart.process_checkout(&db, "pix", &buyer),
            Err(MarketError::Validation(_))
        ));
    }
}
