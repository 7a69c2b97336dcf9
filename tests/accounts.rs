mod support;

use game_market::{
    AccountPatch, AccountStatus, Game, ImageRef, MarketError, ValidationError,
};
use support::{db, genshin_listing, listing, lol_listing, DESCRIPTION};

fn rejected_field(err: MarketError) -> ValidationError {
    match err {
        MarketError::Validation(v) => v,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn add_then_view_counts_once() {
    let db = db();
    let account = db.add_account(listing(Game::Valorant, "Radiant, all agents", 850.0)).unwrap();

    let viewed = db.record_view(&account.id).unwrap().unwrap();
    assert_eq!(viewed.status, AccountStatus::Available);
    assert_eq!(viewed.views, 1);
    assert_eq!(viewed.favorites_count, 0);

    let fetched = db.get_account(&account.id).unwrap().unwrap();
    assert_eq!(fetched.views, 1);
}

#[test]
fn title_length_boundaries() {
    let db = db();
    let err = db.add_account(listing(Game::Cod, &"t".repeat(4), 50.0)).unwrap_err();
    assert!(rejected_field(err).has_field("title"));

    assert!(db.add_account(listing(Game::Cod, &"t".repeat(10), 50.0)).is_ok());
    assert!(db.add_account(listing(Game::Cod, &"t".repeat(11), 50.0)).is_ok());
    assert!(db.add_account(listing(Game::Cod, &"t".repeat(100), 50.0)).is_ok());

    let err = db.add_account(listing(Game::Cod, &"t".repeat(101), 50.0)).unwrap_err();
    assert!(rejected_field(err).has_field("title"));
}

#[test]
fn description_length_boundaries() {
    let db = db();
    let mut short = listing(Game::Cod, "Warzone veteran account", 50.0);
    short.description = "d".repeat(49);
    let err = db.add_account(short).unwrap_err();
    assert!(rejected_field(err).has_field("description"));

    let mut exact = listing(Game::Cod, "Warzone veteran account", 50.0);
    exact.description = "d".repeat(50);
    assert!(db.add_account(exact).is_ok());
}

#[test]
fn price_boundaries() {
    let db = db();
    for price in [4.99, 10000.01, 0.0, -5.0, f64::NAN] {
        let err = db.add_account(listing(Game::Cod, "Warzone veteran account", price)).unwrap_err();
        assert!(rejected_field(err).has_field("price"), "price {price} accepted");
    }
    for price in [5.0, 10000.0] {
        assert!(db.add_account(listing(Game::Cod, "Warzone veteran account", price)).is_ok());
    }
}

#[test]
fn every_violation_is_reported_and_nothing_is_written() {
    let db = db();
    let mut bad = listing(Game::Cod, "short", 1.0);
    bad.description = "tiny".into();
    bad.seller = String::new();

    let errors = rejected_field(db.add_account(bad).unwrap_err());
    for field in ["title", "description", "price", "seller"] {
        assert!(errors.has_field(field), "missing {field}");
    }
    assert_eq!(db.get_stats().unwrap().total_accounts, 0);
}

#[test]
fn game_rules_apply_at_creation() {
    let db = db();
    let err = db
        .add_account(genshin_listing("Genshin fresh start", 20.0, 0))
        .unwrap_err();
    assert!(rejected_field(err).has_field("features.ar_level"));

    let err = db.add_account(lol_listing("LoL unranked smurf", 20.0, "")).unwrap_err();
    assert!(rejected_field(err).has_field("features.rank"));

    assert!(db.add_account(genshin_listing("Genshin AR 45 main", 120.0, 45)).is_ok());
}

#[test]
fn at_most_five_images() {
    let db = db();
    let mut account = listing(Game::Minecraft, "Minecraft Java + Bedrock", 30.0);
    account.images = (0..5).map(|i| ImageRef::uri(format!("mc{i}.png"))).collect();
    assert!(db.add_account(account.clone()).is_ok());

    account.images.push(ImageRef::inline("image/png", b"png").unwrap());
    let err = db.add_account(account).unwrap_err();
    assert!(rejected_field(err).has_field("images"));
}

#[test]
fn later_updates_are_not_revalidated() {
    let db = db();
    let account = db.add_account(listing(Game::Cod, "Warzone veteran account", 50.0)).unwrap();
    let updated = db
        .update_account(
            &account.id,
            AccountPatch {
                title: Some("cheap".into()),
                price: Some(1.0),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "cheap");
    assert_eq!(updated.price, 1.0);
    assert_eq!(updated.description, DESCRIPTION);
    assert!(updated.updated_at >= account.updated_at);
}

#[test]
fn delete_reports_whether_it_removed() {
    let db = db();
    let account = db.add_account(listing(Game::Cod, "Warzone veteran account", 50.0)).unwrap();
    assert!(db.delete_account(&account.id).unwrap());
    assert!(!db.delete_account(&account.id).unwrap());
    assert!(db.get_account(&account.id).unwrap().is_none());
    assert!(db.record_view(&account.id).unwrap().is_none());
}

#[test]
fn seller_listings_include_sold_ones() {
    let db = db();
    let a = db.add_account(listing(Game::Cod, "Warzone veteran account", 50.0)).unwrap();
    db.add_account(listing(Game::Cod, "Warzone second account", 60.0)).unwrap();
    db.update_account(&a.id, AccountPatch::status(AccountStatus::Sold)).unwrap();

    assert_eq!(db.get_seller_accounts("playerpro").unwrap().len(), 2);
    assert!(db.get_seller_accounts("nobody").unwrap().is_empty());
}
