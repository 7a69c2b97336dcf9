use std::sync::Arc;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

use crate::error::MarketError;
use crate::model::Account;
use crate::session::Session;
use crate::storage::{KeyValueStorage, StorageError};

use super::pricing;
use super::{CartConfig, CartItem, CartSummary, CART_KEY};

/// The buyer's cart. Owns the cart document exclusively.
pub struct Cart {
    storage: Arc<dyn KeyValueStorage>,
    pub(super) items: Vec<CartItem>,
    pub(super) config: CartConfig,
    #[cfg(feature = "emitter")]
    emitter: EventEmitter,
}

impl Cart {
    /// Restore the persisted cart. An unreadable document is logged and
    /// replaced by an empty cart.
    pub fn load(storage: Arc<dyn KeyValueStorage>, config: CartConfig) -> Result<Self, MarketError> {
        let items = match storage.get_item(CART_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<CartItem>>(&raw) {
                Ok(items) => items,
                Err(error) => {
                    tracing::warn!(%error, "Discarding unreadable cart");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        tracing::debug!(items = items.len(), "Cart restored");
        Ok(Self {
            storage,
            items,
            config,
            #[cfg(feature = "emitter")]
            emitter: EventEmitter::new(),
        })
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Add a snapshot of `account` with quantity 1. Returns false, leaving
    /// the cart untouched, when the account is already in the cart or not
    /// available.
    pub fn add_account(&mut self, account: &Account) -> Result<bool, MarketError> {
        if self.contains(&account.id) {
            tracing::warn!(account_id = %account.id, "Account already in cart");
            return Ok(false);
        }
        if !account.is_available() {
            tracing::warn!(account_id = %account.id, status = %account.status, "Account not available");
            return Ok(false);
        }
        let mut items = self.items.clone();
        items.push(CartItem::snapshot(account));
        self.commit(items)?;
        tracing::info!(account_id = %account.id, "Added to cart");
        Ok(true)
    }

    /// Remove the line for `account_id`. Returns whether one was removed.
    pub fn remove_account(&mut self, account_id: &str) -> Result<bool, MarketError> {
        if !self.contains(account_id) {
            return Ok(false);
        }
        let items = self
            .items
            .iter()
            .filter(|i| i.account_id() != account_id)
            .cloned()
            .collect();
        self.commit(items)?;
        Ok(true)
    }

    /// Set a line's quantity, clamped to `1..=max_quantity`.
    pub fn update_quantity(&mut self, account_id: &str, quantity: u32) -> Result<bool, MarketError> {
        let max = self.config.max_quantity.max(1);
        let mut items = self.items.clone();
        let Some(item) = items.iter_mut().find(|i| i.account_id() == account_id) else {
            return Ok(false);
        };
        item.quantity = quantity.clamp(1, max);
        self.commit(items)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), MarketError> {
        self.commit(Vec::new())
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.items.iter().any(|i| i.account_id() == account_id)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of price times quantity.
    pub fn calculate_total(&self) -> f64 {
        pricing::subtotal(&self.items)
    }

    pub fn calculate_fees(&self) -> f64 {
        pricing::fees(self.calculate_total(), self.config.fee_rate)
    }

    pub fn calculate_total_with_fees(&self) -> f64 {
        self.calculate_total() + self.calculate_fees()
    }

    pub fn calculate_shipping(&self) -> f64 {
        pricing::shipping()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            item_count: self.item_count(),
            subtotal: self.calculate_total(),
            fees: self.calculate_fees(),
            shipping: self.calculate_shipping(),
            total: self.calculate_total_with_fees() + self.calculate_shipping(),
        }
    }

    /// Re-install a cart stashed before a login redirect. Lines already in
    /// the cart are kept as they are. Returns the number of lines restored.
    pub fn restore_pending(&mut self, session: &Session) -> Result<usize, MarketError> {
        let pending = session.take_pending_cart()?;
        let mut items = self.items.clone();
        let mut restored = 0;
        for item in &pending {
            if !items.iter().any(|i| i.account_id() == item.account_id()) {
                items.push(item.clone());
                restored += 1;
            }
        }
        if restored > 0 {
            if let Err(err) = self.commit(items) {
                if let Err(error) = session.stash_cart(&pending) {
                    tracing::warn!(%error, "Pending cart lost");
                }
                return Err(err);
            }
            tracing::info!(restored, "Pending cart restored");
        }
        Ok(restored)
    }

    /// Register a listener for cart updates. Listeners run on their own
    /// thread after the cart is persisted.
    #[cfg(feature = "emitter")]
    pub fn on_updated<F>(&mut self, listener: F) -> String
    where
        F: Fn(CartSummary) + Send + Sync + 'static,
    {
        self.emitter.on(super::CART_UPDATED, listener)
    }

    /// Persist `items` as the cart, then make them current. A failed write
    /// leaves the cart as it was.
    pub(super) fn commit(&mut self, items: Vec<CartItem>) -> Result<(), MarketError> {
        let raw = serde_json::to_string(&items).map_err(StorageError::from)?;
        self.storage.set_item(CART_KEY, &raw)?;
        self.items = items;
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        let summary = self.summary();
        tracing::debug!(items = summary.item_count, total = summary.total, "Cart updated");
        #[cfg(feature = "emitter")]
        self.emitter.emit(super::CART_UPDATED, summary);
    }
}
