//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use game_market::model::{GenshinFeatures, LolFeatures};
use game_market::{
    Cart, CartConfig, Features, Game, KeyValueStorage, MarketDb, MemoryStorage, NewAccount,
    NewUser, Session, StorageBackend, UserProfile,
};

pub const DESCRIPTION: &str =
    "Hand-levelled account, original email included, never banned or shared.";

pub fn db() -> MarketDb<StorageBackend> {
    MarketDb::new(StorageBackend::in_memory())
}

pub fn flat_db() -> MarketDb<StorageBackend> {
    MarketDb::new(StorageBackend::in_memory_flat())
}

pub fn listing(game: Game, title: &str, price: f64) -> NewAccount {
    NewAccount {
        game,
        title: title.to_string(),
        description: DESCRIPTION.to_string(),
        price,
        seller: "playerpro".to_string(),
        seller_id: None,
        features: Features::default(),
        images: Vec::new(),
    }
}

pub fn lol_listing(title: &str, price: f64, rank: &str) -> NewAccount {
    NewAccount {
        features: Features::Lol(LolFeatures {
            rank: rank.to_string(),
            ..Default::default()
        }),
        ..listing(Game::Lol, title, price)
    }
}

pub fn genshin_listing(title: &str, price: f64, ar_level: u32) -> NewAccount {
    NewAccount {
        features: Features::Genshin(GenshinFeatures {
            ar_level,
            ..Default::default()
        }),
        ..listing(Game::Genshin, title, price)
    }
}

pub fn user(db: &MarketDb<StorageBackend>, name: &str) -> UserProfile {
    db.register_user(NewUser::new(name, format!("{}@example.com", name), "pw"))
        .unwrap()
}

/// Cart and session over one fresh in-memory local store.
pub fn cart_with(config: CartConfig) -> (Cart, Session) {
    let local: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
    let session = Session::new(Arc::clone(&local));
    (Cart::load(local, config).unwrap(), session)
}

pub fn cart() -> (Cart, Session) {
    cart_with(CartConfig::default())
}
