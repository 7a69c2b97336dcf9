use game_market::{
    AccountPatch, AccountStatus, BuyerInfo, CartConfig, CheckoutPolicy, Game, MarketError,
    TransactionStatus,
};

use crate::support::{cart_with, db, listing, user};

fn sequential() -> CartConfig {
    CartConfig {
        policy: CheckoutPolicy::Sequential,
        ..CartConfig::default()
    }
}

#[test]
fn failure_partway_keeps_earlier_sales() {
    let db = db();
    let buyer = user(&db, "bia");
    let (mut cart, _) = cart_with(sequential());
    let first = db.add_account(listing(Game::Lol, "LoL Gold ranked ready", 100.0)).unwrap();
    let second = db.add_account(listing(Game::Valorant, "Valorant Platinum", 50.0)).unwrap();
    cart.add_account(&first).unwrap();
    cart.add_account(&second).unwrap();

    // Another session buys the second account after it was carted.
    db.update_account(&second.id, AccountPatch::status(AccountStatus::Sold)).unwrap();

    let err = cart
        .process_checkout(&db, "pix", &BuyerInfo::from(&buyer))
        .unwrap_err();
    let MarketError::Availability { items } = err else {
        panic!("expected availability error");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].account_id, second.id);

    // No rollback: the first item stays sold and transacted.
    let first_now = db.get_account(&first.id).unwrap().unwrap();
    assert_eq!(first_now.status, AccountStatus::Sold);
    let purchases = db.get_user_purchases(&buyer.id).unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].account_id, first.id);
    assert_eq!(purchases[0].status, TransactionStatus::Pending);
    assert_eq!(
        first_now.sale.as_ref().map(|s| s.transaction_id.as_str()),
        Some(purchases[0].id.as_str())
    );

    // The failed item is still in the cart; the sold one is not.
    assert_eq!(cart.item_count(), 1);
    assert!(cart.contains(&second.id));
    assert_eq!(db.get_user(&buyer.id).unwrap().unwrap().purchases_count, 1);
}

#[test]
fn all_available_sells_everything() {
    let db = db();
    let buyer = user(&db, "bia");
    let (mut cart, _) = cart_with(sequential());
    let a = db.add_account(listing(Game::Lol, "LoL Gold ranked ready", 100.0)).unwrap();
    let b = db.add_account(listing(Game::Valorant, "Valorant Platinum", 50.0)).unwrap();
    cart.add_account(&a).unwrap();
    cart.add_account(&b).unwrap();

    let receipt = cart
        .process_checkout(&db, "pix", &BuyerInfo::from(&buyer))
        .unwrap();
    assert_eq!(receipt.transactions.len(), 2);
    assert_eq!(receipt.total, 150.0);
    assert!(cart.is_empty());
}
