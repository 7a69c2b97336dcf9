//! Game-account marketplace core.
//!
//! - [`storage`]: keyed, versioned record storage with flat and indexed
//!   backends.
//! - [`MarketDb`]: the persistence service (accounts, users, favorites,
//!   reviews, transactions, messages).
//! - [`Cart`]: the buyer's cart, pricing and checkout.
//! - [`Marketplace`]: opens everything from a [`MarketConfig`].

extern crate self as game_market;

pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod market;
pub mod model;
pub mod query;
pub mod session;
pub mod storage;
pub mod telemetry;

pub use cart::{
    BuyerInfo, Cart, CartConfig, CartItem, CartSummary, CheckoutGate, CheckoutPolicy,
    CheckoutReceipt,
};
pub use config::{MarketConfig, StorageConfig};
pub use db::{MarketDb, MarketStats};
pub use error::{FieldError, MarketError, UnavailableItem, ValidationError};
pub use market::Marketplace;
pub use model::{
    Account, AccountPatch, AccountStatus, Favorite, FeatureValue, Features, Game, ImageRef,
    Message, NewAccount, NewMessage, NewReview, NewTransaction, NewUser, Review, Transaction,
    TransactionStatus, UserPatch, UserProfile, UserType,
};
pub use query::{sort_accounts, AccountFilter, AccountSort};
pub use session::{LoginOutcome, Session};
pub use storage::{
    BackendKind, FileStorage, KeyValueStorage, MemoryStorage, Record, RecordStore, RecordsExt,
    StorageBackend, StorageError, Versioned,
};

// Derive macro; lives in the macro namespace beside the `Record` trait.
pub use game_market_macros::Record;

#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
