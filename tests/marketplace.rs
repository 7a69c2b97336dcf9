//! A full purchase through the wired marketplace.

mod support;

use game_market::{
    AccountFilter, AccountStatus, CheckoutGate, Game, MarketConfig, MarketError, Marketplace,
    NewAccount, NewUser, TransactionStatus, UserType,
};
use support::DESCRIPTION;

fn market() -> Marketplace {
    Marketplace::open(MarketConfig {
        seed_sample_data: false,
        ..MarketConfig::default()
    })
    .unwrap()
}

#[test]
fn seller_lists_buyer_checks_out() {
    let mut market = market();

    let seller = market
        .db()
        .register_user(
            NewUser::new("seller_a", "a@example.com", "pw-a").with_type(UserType::Seller),
        )
        .unwrap();
    let title = "Valorant acc"; // 12 characters
    let description = format!("{:<60}", &DESCRIPTION[..40]);
    assert_eq!(title.chars().count(), 12);
    assert_eq!(description.chars().count(), 60);
    let x = market
        .db()
        .add_account(NewAccount {
            game: Game::Valorant,
            title: title.into(),
            description,
            price: 20.0,
            seller: seller.username.clone(),
            seller_id: Some(seller.id.clone()),
            features: Default::default(),
            images: Vec::new(),
        })
        .unwrap();

    let buyer = market
        .db()
        .register_user(NewUser::new("buyer_b", "b@example.com", "pw-b"))
        .unwrap();
    assert!(market.cart_mut().add_account(&x).unwrap());

    assert_eq!(market.start_checkout().unwrap(), CheckoutGate::LoginRequired);
    let outcome = market.login("b@example.com", "pw-b").unwrap().unwrap();
    assert_eq!(outcome.user.id, buyer.id);
    assert!(matches!(market.start_checkout().unwrap(), CheckoutGate::Ready(_)));

    let receipt = market.checkout("pix", Some("+55 11 99999-0000".into())).unwrap();
    assert_eq!(receipt.transactions.len(), 1);
    let tx = &receipt.transactions[0];
    assert_eq!(tx.amount, 20.0);
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.account_id, x.id);
    assert_eq!(tx.buyer_id, buyer.id);
    assert_eq!(tx.buyer_phone.as_deref(), Some("+55 11 99999-0000"));
    assert_eq!(market.db().get_transaction(&tx.id).unwrap().as_ref(), Some(tx));

    let sold = market.db().get_account(&x.id).unwrap().unwrap();
    assert_eq!(sold.status, AccountStatus::Sold);
    let sale = sold.sale.unwrap();
    assert_eq!(sale.buyer_id, buyer.id);
    assert_eq!(sale.transaction_id, tx.id);

    let available = market.db().get_all_accounts(&AccountFilter::default()).unwrap();
    assert!(available.iter().all(|a| a.id != x.id));
    assert!(market.cart().is_empty());
    assert_eq!(market.db().get_user(&seller.id).unwrap().unwrap().sales_count, 1);
}

#[test]
fn pending_cart_follows_the_login_round_trip() {
    let mut market = market();
    market
        .db()
        .register_user(NewUser::new("ana", "ana@example.com", "pw"))
        .unwrap();
    let account = market
        .db()
        .add_account(support::listing(Game::Fortnite, "Fortnite OG skins", 300.0))
        .unwrap();
    market.cart_mut().add_account(&account).unwrap();
    assert_eq!(market.start_checkout().unwrap(), CheckoutGate::LoginRequired);

    market.cart_mut().clear().unwrap();
    market.login("ana@example.com", "pw").unwrap().unwrap();
    assert!(market.cart().contains(&account.id));
}

#[test]
fn move_to_favorites_needs_a_user() {
    let mut market = market();
    let account = market
        .db()
        .add_account(support::listing(Game::Fortnite, "Fortnite OG skins", 300.0))
        .unwrap();
    market.cart_mut().add_account(&account).unwrap();
    assert!(!market.move_to_favorites(&account.id).unwrap());
    assert!(market.cart().contains(&account.id));

    let ana = market
        .db()
        .register_user(NewUser::new("ana", "ana@example.com", "pw"))
        .unwrap();
    market.login("ana@example.com", "pw").unwrap().unwrap();
    assert!(market.move_to_favorites(&account.id).unwrap());
    assert!(market.cart().is_empty());
    assert!(market.db().is_favorite(&ana.id, &account.id).unwrap());
}

#[test]
fn move_to_favorites_keeps_the_line_when_the_listing_is_gone() {
    let mut market = market();
    let account = market
        .db()
        .add_account(support::listing(Game::Fortnite, "Fortnite OG skins", 300.0))
        .unwrap();
    market.cart_mut().add_account(&account).unwrap();
    market
        .db()
        .register_user(NewUser::new("ana", "ana@example.com", "pw"))
        .unwrap();
    market.login("ana@example.com", "pw").unwrap().unwrap();
    assert!(market.db().delete_account(&account.id).unwrap());

    let err = market.move_to_favorites(&account.id).unwrap_err();
    assert!(matches!(err, MarketError::NotFound { table: "accounts", .. }));
    assert!(market.cart().contains(&account.id));
}

#[test]
fn clear_all_data_wipes_everything() {
    let mut market = Marketplace::open(MarketConfig::default()).unwrap();
    let account = market
        .db()
        .get_all_accounts(&AccountFilter::default())
        .unwrap()
        .remove(0);
    market.cart_mut().add_account(&account).unwrap();

    market.clear_all_data().unwrap();
    assert_eq!(market.db().get_stats().unwrap().total_accounts, 0);
    assert!(market.cart().is_empty());
    assert!(market.session().current_user().unwrap().is_none());
}
