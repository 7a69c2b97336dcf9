use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::ids;
use crate::Record;

use super::{Features, Game, ImageRef};

pub const MIN_TITLE_LEN: usize = 10;
pub const MAX_TITLE_LEN: usize = 100;
pub const MIN_DESCRIPTION_LEN: usize = 50;
pub const MIN_PRICE: f64 = 5.0;
pub const MAX_PRICE: f64 = 10_000.0;
pub const MAX_IMAGES: usize = 5;

/// Listing status. `Available -> Sold` is the only transition the core makes
/// on its own; checkout compensation is the one path that moves back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Available,
    Sold,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Available => f.write_str("available"),
            AccountStatus::Sold => f.write_str("sold"),
        }
    }
}

/// Stamped on an account when checkout sells it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleInfo {
    pub sold_at: DateTime<Utc>,
    pub transaction_id: String,
    pub buyer_id: String,
}

/// A sellable game-account listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[record(table = "accounts")]
pub struct Account {
    pub id: String,
    #[record(index)]
    pub game: Game,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Seller display name.
    #[record(index)]
    pub seller: String,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[record(index)]
    pub status: AccountStatus,
    pub views: u64,
    pub favorites_count: u64,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sale: Option<SaleInfo>,
}

impl Account {
    pub fn is_available(&self) -> bool {
        self.status == AccountStatus::Available
    }

    /// Lowercased title, description, game code and seller, space separated.
    pub fn searchable_text(&self) -> String {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.game.code(),
            self.seller.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// Seller input for a new listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub game: Game,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub seller: String,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl NewAccount {
    /// Creation-time checks. Later mutations are not re-validated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.game.code().trim().is_empty() {
            errors.push("game", "is required");
        }

        let title_len = self.title.chars().count();
        if title_len < MIN_TITLE_LEN {
            errors.push("title", format!("must be at least {} characters", MIN_TITLE_LEN));
        } else if title_len > MAX_TITLE_LEN {
            errors.push("title", format!("must be at most {} characters", MAX_TITLE_LEN));
        }

        if self.description.chars().count() < MIN_DESCRIPTION_LEN {
            errors.push(
                "description",
                format!("must be at least {} characters", MIN_DESCRIPTION_LEN),
            );
        }

        if !self.price.is_finite() || self.price < MIN_PRICE || self.price > MAX_PRICE {
            errors.push(
                "price",
                format!("must be between {} and {}", MIN_PRICE, MAX_PRICE),
            );
        }

        if self.seller.trim().is_empty() {
            errors.push("seller", "is required");
        }

        if self.images.len() > MAX_IMAGES {
            errors.push("images", format!("at most {} images", MAX_IMAGES));
        }

        if let Some(game) = self.features.game() {
            if game != self.game {
                errors.push(
                    "features",
                    format!("{} features on a {} listing", game, self.game),
                );
            }
        }
        for (field, message) in self.features.rule_violations() {
            errors.push(field, message);
        }

        errors.into_result()
    }

    /// Build the stored record with generated fields.
    pub(crate) fn into_account(self) -> Account {
        let now = ids::now();
        Account {
            id: ids::new_id(),
            game: self.game,
            title: self.title,
            description: self.description,
            price: self.price,
            seller: self.seller,
            seller_id: self.seller_id,
            features: self.features,
            images: self.images,
            status: AccountStatus::Available,
            views: 0,
            favorites_count: 0,
            verified: false,
            created_at: now,
            updated_at: now,
            sale: None,
        }
    }
}

/// Partial update merged into an existing account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub seller_id: Option<String>,
    pub features: Option<Features>,
    pub images: Option<Vec<ImageRef>>,
    pub status: Option<AccountStatus>,
    pub verified: Option<bool>,
    pub views: Option<u64>,
    pub favorites_count: Option<u64>,
    /// `Some(None)` clears the sale stamp.
    pub sale: Option<Option<SaleInfo>>,
}

impl AccountPatch {
    pub fn status(status: AccountStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, account: &mut Account) {
        if let Some(v) = self.title {
            account.title = v;
        }
        if let Some(v) = self.description {
            account.description = v;
        }
        if let Some(v) = self.price {
            account.price = v;
        }
        if let Some(v) = self.seller_id {
            account.seller_id = Some(v);
        }
        if let Some(v) = self.features {
            account.features = v;
        }
        if let Some(v) = self.images {
            account.images = v;
        }
        if let Some(v) = self.status {
            account.status = v;
        }
        if let Some(v) = self.verified {
            account.verified = v;
        }
        if let Some(v) = self.views {
            account.views = v;
        }
        if let Some(v) = self.favorites_count {
            account.favorites_count = v;
        }
        if let Some(v) = self.sale {
            account.sale = v;
        }
        account.updated_at = ids::now();
    }
}
