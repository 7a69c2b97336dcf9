//! Session markers kept beside the data: the signed-in user, where to go
//! after login, and a cart stashed across the login round trip.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cart::CartItem;
use crate::db::MarketDb;
use crate::error::MarketError;
use crate::model::UserProfile;
use crate::storage::{KeyValueStorage, RecordStore};

pub const CURRENT_USER_KEY: &str = "current_user";
pub const RETURN_TO_KEY: &str = "return_to";
pub const PENDING_CART_KEY: &str = "pending_cart";

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: UserProfile,
    /// Where the caller asked to resume; consumed by this login.
    pub return_to: Option<String>,
}

#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn KeyValueStorage>,
}

impl Session {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn current_user(&self) -> Result<Option<UserProfile>, MarketError> {
        self.read(CURRENT_USER_KEY)
    }

    /// True when a user with email and username is signed in.
    pub fn is_authenticated(&self) -> Result<bool, MarketError> {
        Ok(self
            .current_user()?
            .is_some_and(|u| !u.email.is_empty() && !u.username.is_empty()))
    }

    pub fn login<S: RecordStore>(
        &self,
        db: &MarketDb<S>,
        email: &str,
        password: &str,
    ) -> Result<Option<LoginOutcome>, MarketError> {
        let Some(user) = db.login_user(email, password)? else {
            return Ok(None);
        };
        self.write(CURRENT_USER_KEY, &user)?;
        let return_to = self.take_return_to()?;
        Ok(Some(LoginOutcome { user, return_to }))
    }

    /// Sign in a freshly registered user without a password round trip.
    pub fn sign_in(&self, user: &UserProfile) -> Result<(), MarketError> {
        self.write(CURRENT_USER_KEY, user)
    }

    pub fn logout(&self) -> Result<(), MarketError> {
        self.storage.remove_item(CURRENT_USER_KEY)?;
        Ok(())
    }

    pub fn set_return_to(&self, target: &str) -> Result<(), MarketError> {
        self.storage.set_item(RETURN_TO_KEY, target)?;
        Ok(())
    }

    pub fn take_return_to(&self) -> Result<Option<String>, MarketError> {
        let target = self.storage.get_item(RETURN_TO_KEY)?;
        if target.is_some() {
            self.storage.remove_item(RETURN_TO_KEY)?;
        }
        Ok(target)
    }

    pub(crate) fn stash_cart(&self, items: &[CartItem]) -> Result<(), MarketError> {
        self.write(PENDING_CART_KEY, items)
    }

    pub(crate) fn take_pending_cart(&self) -> Result<Vec<CartItem>, MarketError> {
        let items: Option<Vec<CartItem>> = self.read(PENDING_CART_KEY)?;
        if items.is_some() {
            self.storage.remove_item(PENDING_CART_KEY)?;
        }
        Ok(items.unwrap_or_default())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, MarketError> {
        match self.storage.get_item(key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(error) => {
                    tracing::warn!(key, %error, "Dropping unreadable session marker");
                    self.storage.remove_item(key)?;
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), MarketError> {
        let raw = serde_json::to_string(value).map_err(crate::storage::StorageError::from)?;
        self.storage.set_item(key, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewUser;
    use crate::storage::{MemoryStorage, StorageBackend};

    fn session() -> Session {
        Session::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn login_consumes_return_marker() {
        let db = MarketDb::new(StorageBackend::in_memory());
        db.register_user(NewUser::new("ana", "ana@example.com", "pw")).unwrap();
        let session = session();
        session.set_return_to("checkout").unwrap();

        let outcome = session.login(&db, "ana@example.com", "pw").unwrap().unwrap();
        assert_eq!(outcome.return_to.as_deref(), Some("checkout"));
        assert!(session.is_authenticated().unwrap());
        assert_eq!(session.take_return_to().unwrap(), None);
    }

    #[test]
    fn failed_login_keeps_marker() {
        let db = MarketDb::new(StorageBackend::in_memory());
        let session = session();
        session.set_return_to("checkout").unwrap();
        assert!(session.login(&db, "ghost@example.com", "pw").unwrap().is_none());
        assert!(!session.is_authenticated().unwrap());
        assert_eq!(session.take_return_to().unwrap().as_deref(), Some("checkout"));
    }

    #[test]
    fn unreadable_user_marker_reads_as_signed_out() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(CURRENT_USER_KEY, "{not json").unwrap();
        let session = Session::new(storage);
        assert!(session.current_user().unwrap().is_none());
    }
}
