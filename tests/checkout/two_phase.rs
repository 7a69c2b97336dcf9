use std::sync::Mutex;

use game_market::{
    AccountPatch, AccountStatus, BuyerInfo, CartConfig, CheckoutPolicy, Game, MarketDb,
    MarketError, NewUser, Record, RecordStore, StorageBackend, StorageError, TransactionStatus,
    Versioned,
};

use crate::support::{cart, cart_with, db, listing, user};

#[test]
fn unavailable_item_aborts_before_any_write() {
    let db = db();
    let buyer = user(&db, "bia");
    let (mut cart, _) = cart();
    let first = db.add_account(listing(Game::Lol, "LoL Gold ranked ready", 100.0)).unwrap();
    let second = db.add_account(listing(Game::Valorant, "Valorant Platinum", 50.0)).unwrap();
    let third = db.add_account(listing(Game::Diablo, "Diablo IV season ready", 80.0)).unwrap();
    for account in [&first, &second, &third] {
        cart.add_account(account).unwrap();
    }
    db.update_account(&second.id, AccountPatch::status(AccountStatus::Sold)).unwrap();
    db.delete_account(&third.id).unwrap();

    let err = cart
        .process_checkout(&db, "pix", &BuyerInfo::from(&buyer))
        .unwrap_err();
    let MarketError::Availability { items } = err else {
        panic!("expected availability error");
    };
    let ids: Vec<&str> = items.iter().map(|i| i.account_id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), third.id.as_str()]);

    assert!(db.get_account(&first.id).unwrap().unwrap().is_available());
    assert!(db.get_user_purchases(&buyer.id).unwrap().is_empty());
    assert_eq!(cart.item_count(), 3);
}

#[test]
fn sale_updates_buyer_and_seller_stats() {
    let db = db();
    let buyer = user(&db, "bia");
    let seller = db
        .register_user(NewUser::new("vendor", "vendor@example.com", "pw"))
        .unwrap();
    let (mut cart, _) = cart();
    let mut new = listing(Game::Lol, "LoL Gold ranked ready", 100.0);
    new.seller = seller.username.clone();
    new.seller_id = Some(seller.id.clone());
    let account = db.add_account(new).unwrap();
    cart.add_account(&account).unwrap();
    cart.update_quantity(&account.id, 2).unwrap();

    let receipt = cart
        .process_checkout(&db, "card", &BuyerInfo::from(&buyer))
        .unwrap();
    assert_eq!(receipt.total, 200.0);
    assert_eq!(receipt.transactions[0].seller_id, seller.id);

    let buyer = db.get_user(&buyer.id).unwrap().unwrap();
    assert_eq!(buyer.purchases_count, 1);
    assert_eq!(buyer.total_spent, 200.0);
    assert_eq!(db.get_user(&seller.id).unwrap().unwrap().sales_count, 1);
    assert_eq!(db.get_seller_sales(&seller.id).unwrap().len(), 1);
}

/// Store that lets another writer touch one account right before the
/// checkout's guarded update lands.
struct RacingStore {
    inner: StorageBackend,
    victim: Mutex<Option<String>>,
}

impl RecordStore for RacingStore {
    fn get<M: Record>(&self, key: &str) -> Result<Option<Versioned<M>>, StorageError> {
        self.inner.get(key)
    }

    fn get_all<M: Record>(&self) -> Result<Vec<Versioned<M>>, StorageError> {
        self.inner.get_all()
    }

    fn get_all_by_index<M: Record>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Versioned<M>>, StorageError> {
        self.inner.get_all_by_index(field, value)
    }

    fn put<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        self.inner.put(record)
    }

    fn insert<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        self.inner.insert(record)
    }

    fn update<M: Record>(
        &self,
        record: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, StorageError> {
        let key = record.key();
        let hit = {
            let mut victim = self.victim.lock().unwrap();
            if M::TABLE == "accounts" && victim.as_deref() == Some(key.as_str()) {
                victim.take();
                true
            } else {
                false
            }
        };
        if hit {
            if let Some(current) = self.inner.get::<M>(&key)? {
                self.inner.put(&current.data)?;
            }
        }
        self.inner.update(record, expected_version)
    }

    fn delete<M: Record>(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.delete::<M>(key)
    }

    fn clear<M: Record>(&self) -> Result<(), StorageError> {
        self.inner.clear::<M>()
    }
}

#[test]
fn conflict_mid_commit_compensates_earlier_items() {
    let db = MarketDb::new(RacingStore {
        inner: StorageBackend::in_memory(),
        victim: Mutex::new(None),
    });
    let buyer = db
        .register_user(NewUser::new("bia", "bia@example.com", "pw"))
        .unwrap();
    let (mut cart, _) = cart();
    let first = db.add_account(listing(Game::Lol, "LoL Gold ranked ready", 100.0)).unwrap();
    let second = db.add_account(listing(Game::Valorant, "Valorant Platinum", 50.0)).unwrap();
    cart.add_account(&first).unwrap();
    cart.add_account(&second).unwrap();

    *db.store().victim.lock().unwrap() = Some(second.id.clone());

    let err = cart
        .process_checkout(&db, "pix", &BuyerInfo::from(&buyer))
        .unwrap_err();
    assert!(matches!(err, MarketError::Conflict { ref key, .. } if *key == second.id));

    let first_now = db.get_account(&first.id).unwrap().unwrap();
    assert_eq!(first_now.status, AccountStatus::Available);
    assert!(first_now.sale.is_none());
    assert!(db.get_account(&second.id).unwrap().unwrap().is_available());

    let purchases = db.get_user_purchases(&buyer.id).unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].status, TransactionStatus::Cancelled);

    let buyer = db.get_user(&buyer.id).unwrap().unwrap();
    assert_eq!(buyer.purchases_count, 0);
    assert_eq!(buyer.total_spent, 0.0);
    assert_eq!(cart.item_count(), 2);
}

/// Store whose `users` table refuses every update, so user stats can never
/// be written.
struct StatsDownStore {
    inner: StorageBackend,
}

impl RecordStore for StatsDownStore {
    fn get<M: Record>(&self, key: &str) -> Result<Option<Versioned<M>>, StorageError> {
        self.inner.get(key)
    }

    fn get_all<M: Record>(&self) -> Result<Vec<Versioned<M>>, StorageError> {
        self.inner.get_all()
    }

    fn get_all_by_index<M: Record>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Versioned<M>>, StorageError> {
        self.inner.get_all_by_index(field, value)
    }

    fn put<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        self.inner.put(record)
    }

    fn insert<M: Record>(&self, record: &M) -> Result<Versioned<M>, StorageError> {
        self.inner.insert(record)
    }

    fn update<M: Record>(
        &self,
        record: &M,
        expected_version: u64,
    ) -> Result<Versioned<M>, StorageError> {
        if M::TABLE == "users" {
            return Err(StorageError::Io("users table is read-only".into()));
        }
        self.inner.update(record, expected_version)
    }

    fn delete<M: Record>(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.delete::<M>(key)
    }

    fn clear<M: Record>(&self) -> Result<(), StorageError> {
        self.inner.clear::<M>()
    }
}

#[test]
fn failed_stats_write_undoes_the_stamped_sale() {
    for policy in [CheckoutPolicy::TwoPhase, CheckoutPolicy::Sequential] {
        let db = MarketDb::new(StatsDownStore {
            inner: StorageBackend::in_memory(),
        });
        let buyer = db
            .register_user(NewUser::new("bia", "bia@example.com", "pw"))
            .unwrap();
        let (mut cart, _) = cart_with(CartConfig {
            policy,
            ..CartConfig::default()
        });
        let account = db.add_account(listing(Game::Lol, "LoL Gold ranked ready", 100.0)).unwrap();
        cart.add_account(&account).unwrap();

        let err = cart
            .process_checkout(&db, "pix", &BuyerInfo::from(&buyer))
            .unwrap_err();
        assert!(
            matches!(err, MarketError::Storage(StorageError::Io(_))),
            "{policy:?}: {err:?}"
        );

        let now = db.get_account(&account.id).unwrap().unwrap();
        assert!(now.is_available(), "{policy:?}");
        assert!(now.sale.is_none(), "{policy:?}");

        let purchases = db.get_user_purchases(&buyer.id).unwrap();
        assert_eq!(purchases.len(), 1, "{policy:?}");
        assert_eq!(purchases[0].status, TransactionStatus::Cancelled, "{policy:?}");
        assert_eq!(cart.item_count(), 1, "{policy:?}");
    }
}
