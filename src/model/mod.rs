//! Marketplace entities and their creation-time validation.

mod account;
mod favorite;
mod game;
mod image;
mod message;
mod review;
mod transaction;
mod user;

pub use account::{
    Account, AccountPatch, AccountStatus, NewAccount, SaleInfo, MAX_IMAGES, MAX_PRICE,
    MAX_TITLE_LEN, MIN_DESCRIPTION_LEN, MIN_PRICE, MIN_TITLE_LEN,
};
pub use favorite::Favorite;
pub use game::{
    Attributes, DiabloFeatures, FeatureValue, Features, Game, GenshinFeatures, LolFeatures,
    MobileLegendsFeatures, ValorantFeatures,
};
pub use image::{ImageRef, ALLOWED_IMAGE_TYPES, MAX_IMAGE_BYTES};
pub use message::{conversation_id, Message, NewMessage};
pub use review::{average_rating, NewReview, Review};
pub use transaction::{NewTransaction, Transaction, TransactionStatus, DEFAULT_PAYMENT_METHOD};
pub use user::{Credential, NewUser, User, UserPatch, UserProfile, UserType, DEFAULT_RATING};
