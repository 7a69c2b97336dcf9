use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::ids;
use crate::Record;

pub const DEFAULT_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Buyer,
    Seller,
    Admin,
}

/// Salted SHA3-256 password digest. Plaintext is never stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    salt: String,
    digest: String,
}

impl Credential {
    pub fn new(password: &str) -> Self {
        let salt = STANDARD.encode(Uuid::new_v4().as_bytes());
        let digest = Self::hash(&salt, password);
        Self { salt, digest }
    }

    pub fn verify(&self, password: &str) -> bool {
        Self::hash(&self.salt, password) == self.digest
    }

    fn hash(salt: &str, password: &str) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        STANDARD.encode(hasher.finalize())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// A registered user as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[record(table = "users")]
pub struct User {
    pub id: String,
    #[record(index)]
    pub username: String,
    #[record(index)]
    pub email: String,
    pub credential: Credential,
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default)]
    pub phone: Option<String>,
    pub verified: bool,
    pub rating: f64,
    pub sales_count: u64,
    pub purchases_count: u64,
    pub balance: f64,
    #[serde(default)]
    pub total_spent: f64,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user. Login and lookups hand this out instead of
/// [`User`] so the credential never leaves the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub phone: Option<String>,
    pub verified: bool,
    pub rating: f64,
    pub sales_count: u64,
    pub purchases_count: u64,
    pub balance: f64,
    pub total_spent: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            user_type: user.user_type,
            phone: user.phone.clone(),
            verified: user.verified,
            rating: user.rating,
            sales_count: user.sales_count,
            purchases_count: user.purchases_count,
            balance: user.balance,
            total_spent: user.total_spent,
            created_at: user.created_at,
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            user_type: UserType::Buyer,
            phone: None,
        }
    }

    pub fn with_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.username.trim().is_empty() {
            errors.push("username", "is required");
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.push("email", "is required");
        } else if !email.contains('@') {
            errors.push("email", "is not a valid address");
        }
        if self.password.is_empty() {
            errors.push("password", "is required");
        }
        errors.into_result()
    }

    pub(crate) fn into_user(self) -> User {
        User {
            id: ids::new_id(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            credential: Credential::new(&self.password),
            user_type: self.user_type,
            phone: self.phone,
            verified: false,
            rating: DEFAULT_RATING,
            sales_count: 0,
            purchases_count: 0,
            balance: 0.0,
            total_spent: 0.0,
            created_at: ids::now(),
        }
    }
}

/// Partial update of a user. Username and email are immutable after
/// registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub password: Option<String>,
    pub user_type: Option<UserType>,
    pub phone: Option<String>,
    pub verified: Option<bool>,
    pub rating: Option<f64>,
    pub balance: Option<f64>,
}

impl UserPatch {
    pub(crate) fn apply(self, user: &mut User) {
        if let Some(password) = self.password {
            user.credential = Credential::new(&password);
        }
        if let Some(v) = self.user_type {
            user.user_type = v;
        }
        if let Some(v) = self.phone {
            user.phone = Some(v);
        }
        if let Some(v) = self.verified {
            user.verified = v;
        }
        if let Some(v) = self.rating {
            user.rating = v;
        }
        if let Some(v) = self.balance {
            user.balance = v;
        }
    }
}
