//! Marketplace lifecycle: opens storage and wires the services together.

use std::sync::Arc;

use crate::cart::{BuyerInfo, Cart, CheckoutGate, CheckoutReceipt};
use crate::config::MarketConfig;
use crate::db::MarketDb;
use crate::error::MarketError;
use crate::session::{LoginOutcome, Session};
use crate::storage::{BackendKind, FileStorage, KeyValueStorage, MemoryStorage, StorageBackend};

/// Explicitly constructed marketplace: one persistence service, one cart
/// and one session sharing the same local storage.
pub struct Marketplace {
    db: Arc<MarketDb<StorageBackend>>,
    cart: Cart,
    session: Session,
    config: MarketConfig,
}

impl Marketplace {
    pub fn open(config: MarketConfig) -> Result<Self, MarketError> {
        config.validate()?;

        let local: Arc<dyn KeyValueStorage> = match &config.storage.data_dir {
            Some(dir) => Arc::new(FileStorage::open(dir.join("local"))?),
            None => Arc::new(MemoryStorage::new()),
        };
        let store = StorageBackend::open(
            config.storage.backend,
            config.storage.data_dir.as_deref(),
            Arc::clone(&local),
        );
        let backend = store.kind();
        let db = Arc::new(MarketDb::new(store));
        if config.seed_sample_data {
            db.seed_sample_data()?;
        }

        let session = Session::new(Arc::clone(&local));
        let cart = Cart::load(local, config.cart)?;

        tracing::info!(
            ?backend,
            data_dir = ?config.storage.data_dir,
            cart_items = cart.item_count(),
            "Marketplace opened"
        );
        Ok(Self {
            db,
            cart,
            session,
            config,
        })
    }

    pub fn db(&self) -> &MarketDb<StorageBackend> {
        &self.db
    }

    /// Shared handle for callers that outlive a borrow of the marketplace.
    pub fn db_handle(&self) -> Arc<MarketDb<StorageBackend>> {
        Arc::clone(&self.db)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.db.store().kind()
    }

    /// Log in and bring back a cart stashed by a login-gated checkout.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Option<LoginOutcome>, MarketError> {
        let outcome = self.session.login(&*self.db, email, password)?;
        if outcome.is_some() {
            self.cart.restore_pending(&self.session)?;
        }
        Ok(outcome)
    }

    pub fn logout(&self) -> Result<(), MarketError> {
        self.session.logout()
    }

    pub fn start_checkout(&mut self) -> Result<CheckoutGate, MarketError> {
        self.cart.start_checkout(&*self.db, &self.session)
    }

    /// Check out as the signed-in user. `phone` overrides the profile phone.
    pub fn checkout(
        &mut self,
        payment_method: &str,
        phone: Option<String>,
    ) -> Result<CheckoutReceipt, MarketError> {
        let Some(user) = self.session.current_user()? else {
            return Err(MarketError::NotFound {
                table: "session",
                id: crate::session::CURRENT_USER_KEY.to_string(),
            });
        };
        let mut buyer = BuyerInfo::from(&user);
        if phone.is_some() {
            buyer.phone = phone;
        }
        self.cart.process_checkout(&*self.db, payment_method, &buyer)
    }

    /// Take a line out of the cart and bookmark it for the signed-in user.
    /// Returns false when there is no such line or nobody is signed in.
    pub fn move_to_favorites(&mut self, account_id: &str) -> Result<bool, MarketError> {
        let Some(user) = self.session.current_user()? else {
            tracing::warn!("Favorites need a signed-in user");
            return Ok(false);
        };
        if !self.cart.contains(account_id) {
            return Ok(false);
        }
        self.db.add_favorite(&user.id, account_id)?;
        self.cart.remove_account(account_id)?;
        Ok(true)
    }

    /// Wipe every table, the cart and the session.
    pub fn clear_all_data(&mut self) -> Result<(), MarketError> {
        self.db.clear_all_data()?;
        self.cart.clear()?;
        self.session.logout()?;
        Ok(())
    }

    /// Close the marketplace. Every write is already durable; this only
    /// releases the services.
    pub fn shutdown(self) {
        tracing::info!(cart_items = self.cart.item_count(), "Marketplace closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewUser;

    fn config() -> MarketConfig {
        MarketConfig {
            seed_sample_data: false,
            ..MarketConfig::default()
        }
    }

    #[test]
    fn opens_in_memory_indexed_by_default() {
        let market = Marketplace::open(config()).unwrap();
        assert_eq!(market.backend_kind(), BackendKind::Indexed);
        assert!(market.cart().is_empty());
    }

    #[test]
    fn seeds_catalog_when_asked() {
        let market = Marketplace::open(MarketConfig::default()).unwrap();
        assert_eq!(market.db().get_stats().unwrap().total_accounts, 6);
    }

    #[test]
    fn checkout_requires_signed_in_user() {
        let mut market = Marketplace::open(config()).unwrap();
        market
            .db()
            .register_user(NewUser::new("ana", "ana@example.com", "pw"))
            .unwrap();
        assert!(matches!(
            market.checkout("pix", None),
            Err(MarketError::NotFound { table: "session", .. })
        ));
    }
}
