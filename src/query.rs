//! Account filter contract and caller-side sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{Account, AccountStatus, Attributes, Game};

/// Filter accepted by `MarketDb::get_all_accounts`.
///
/// Absent keys leave that dimension unconstrained. `status` defaults to
/// available; set it to `None` to match every status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountFilter {
    pub status: Option<AccountStatus>,
    pub game: Option<Game>,
    /// Inclusive.
    pub min_price: Option<f64>,
    /// Inclusive.
    pub max_price: Option<f64>,
    pub seller: Option<String>,
    /// Every listed key must be present on the account with an equal value.
    pub features: Attributes,
    /// Case-insensitive substring of title, description, game and seller.
    pub search: Option<String>,
}

impl Default for AccountFilter {
    fn default() -> Self {
        Self {
            status: Some(AccountStatus::Available),
            game: None,
            min_price: None,
            max_price: None,
            seller: None,
            features: Attributes::new(),
            search: None,
        }
    }
}

impl AccountFilter {
    pub fn any_status() -> Self {
        Self {
            status: None,
            ..Self::default()
        }
    }

    pub fn status(mut self, status: AccountStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn game(mut self, game: impl Into<Game>) -> Self {
        self.game = Some(game.into());
        self
    }

    pub fn price_between(mut self, min: f64, max: f64) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    pub fn seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    pub fn feature(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::model::FeatureValue>,
    ) -> Self {
        self.features.insert(key.into(), value.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn matches(&self, account: &Account) -> bool {
        if let Some(status) = self.status {
            if account.status != status {
                return false;
            }
        }
        if let Some(game) = &self.game {
            if &account.game != game {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if account.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if account.price > max {
                return false;
            }
        }
        if let Some(seller) = &self.seller {
            if &account.seller != seller {
                return false;
            }
        }
        if !self.features.is_empty() {
            let attrs = account.features.attributes();
            let all_match = self
                .features
                .iter()
                .all(|(key, wanted)| attrs.get(key) == Some(wanted));
            if !all_match {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !term.is_empty() && !account.searchable_text().contains(&term) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSort {
    PriceAsc,
    PriceDesc,
    /// Most recently created first.
    #[default]
    Newest,
    /// Most viewed first.
    Popular,
}

/// Stable sort; equal keys keep their storage order. `Newest` breaks
/// timestamp ties by id, which grows with creation time.
pub fn sort_accounts(accounts: &mut [Account], sort: AccountSort) {
    match sort {
        AccountSort::PriceAsc => accounts.sort_by(|a, b| cmp_price(a, b)),
        AccountSort::PriceDesc => accounts.sort_by(|a, b| cmp_price(b, a)),
        AccountSort::Newest => accounts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        }),
        AccountSort::Popular => accounts.sort_by(|a, b| b.views.cmp(&a.views)),
    }
}

fn cmp_price(a: &Account, b: &Account) -> Ordering {
    a.price.total_cmp(&b.price)
}
