use game_market::{
    AccountPatch, AccountStatus, CheckoutGate, Game, MarketError, NewUser,
};

use crate::support::{cart, db, listing};

#[test]
fn empty_cart_does_not_open_checkout() {
    let db = db();
    let (mut cart, session) = cart();
    assert_eq!(cart.start_checkout(&db, &session).unwrap(), CheckoutGate::EmptyCart);
}

#[test]
fn unavailable_items_are_purged_and_listed() {
    let db = db();
    let (mut cart, session) = cart();
    let keep = db.add_account(listing(Game::Lol, "LoL Gold ranked ready", 100.0)).unwrap();
    let sold = db.add_account(listing(Game::Valorant, "Valorant Platinum", 50.0)).unwrap();
    let gone = db.add_account(listing(Game::Diablo, "Diablo IV season ready", 80.0)).unwrap();
    for account in [&keep, &sold, &gone] {
        cart.add_account(account).unwrap();
    }
    db.update_account(&sold.id, AccountPatch::status(AccountStatus::Sold)).unwrap();
    db.delete_account(&gone.id).unwrap();

    let err = cart.start_checkout(&db, &session).unwrap_err();
    let MarketError::Availability { items } = err else {
        panic!("expected availability error");
    };
    let removed: Vec<&str> = items.iter().map(|i| i.account_id.as_str()).collect();
    assert_eq!(removed, vec![sold.id.as_str(), gone.id.as_str()]);
    assert_eq!(items[0].title, "Valorant Platinum");

    assert_eq!(cart.item_count(), 1);
    assert!(cart.contains(&keep.id));
}

#[test]
fn anonymous_buyer_is_sent_to_login() {
    let db = db();
    let (mut cart, session) = cart();
    let account = db.add_account(listing(Game::Lol, "LoL Gold ranked ready", 100.0)).unwrap();
    cart.add_account(&account).unwrap();

    assert_eq!(cart.start_checkout(&db, &session).unwrap(), CheckoutGate::LoginRequired);

    db.register_user(NewUser::new("ana", "ana@example.com", "pw")).unwrap();
    let outcome = session.login(&db, "ana@example.com", "pw").unwrap().unwrap();
    assert_eq!(outcome.return_to.as_deref(), Some("checkout"));

    match cart.start_checkout(&db, &session).unwrap() {
        CheckoutGate::Ready(summary) => {
            assert_eq!(summary.item_count, 1);
            assert_eq!(summary.total, 105.0);
        }
        other => panic!("expected ready, got {other:?}"),
    }
}
