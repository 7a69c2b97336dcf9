use crate::error::MarketError;
use crate::model::{NewUser, User, UserPatch, UserProfile};
use crate::storage::{RecordStore, RecordsExt, StorageError};

use super::MarketDb;

impl<S: RecordStore> MarketDb<S> {
    /// Register a user. Email and username are unique (exact, case-sensitive
    /// match); the check and the insert happen under one guard so two
    /// concurrent registrations cannot both claim the same value.
    pub fn register_user(&self, data: NewUser) -> Result<UserProfile, MarketError> {
        data.validate()?;
        let user = data.into_user();

        let _guard = self
            .registration
            .lock()
            .map_err(|_| StorageError::LockPoisoned("register_user"))?;

        let users = self.store.table::<User>();
        if !users.by_index("email", &user.email)?.is_empty() {
            tracing::warn!(email = %user.email, "Registration rejected: email taken");
            return Err(MarketError::Duplicate {
                field: "email",
                value: user.email,
            });
        }
        if !users.by_index("username", &user.username)?.is_empty() {
            tracing::warn!(username = %user.username, "Registration rejected: username taken");
            return Err(MarketError::Duplicate {
                field: "username",
                value: user.username,
            });
        }

        let stored = users.insert(&user)?;
        tracing::info!(user_id = %stored.data.id, username = %stored.data.username, "User registered");
        Ok(UserProfile::from(&stored.data))
    }

    /// Profile of the user with this email if the password matches.
    pub fn login_user(&self, email: &str, password: &str) -> Result<Option<UserProfile>, MarketError> {
        let profile = self
            .store
            .table::<User>()
            .by_index("email", email)?
            .into_iter()
            .find(|v| v.data.credential.verify(password))
            .map(|v| UserProfile::from(&v.data));
        match &profile {
            Some(p) => tracing::info!(user_id = %p.id, "Login succeeded"),
            None => tracing::info!(email, "Login failed"),
        }
        Ok(profile)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserProfile>, MarketError> {
        Ok(self
            .store
            .table::<User>()
            .get(id)?
            .map(|v| UserProfile::from(&v.data)))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserProfile>, MarketError> {
        Ok(self
            .store
            .table::<User>()
            .by_index("username", username)?
            .first()
            .map(|v| UserProfile::from(&v.data)))
    }

    pub fn update_user(&self, id: &str, patch: UserPatch) -> Result<Option<UserProfile>, MarketError> {
        let updated = self.modify::<User, _>(id, |u| patch.clone().apply(u))?;
        Ok(updated.as_ref().map(UserProfile::from))
    }

    /// Buyer-side stats after a sale.
    pub(crate) fn record_purchase(&self, buyer_id: &str, amount: f64) -> Result<(), MarketError> {
        let updated = self.modify::<User, _>(buyer_id, |u| {
            u.purchases_count += 1;
            u.total_spent += amount;
        })?;
        if updated.is_none() {
            tracing::debug!(buyer_id, "Purchase stats skipped: unknown buyer");
        }
        Ok(())
    }

    /// Seller-side stats after a sale. `seller` is a user id or, for listings
    /// without one, the seller's username.
    pub(crate) fn record_sale(&self, seller: &str) -> Result<(), MarketError> {
        let id = match self.store.table::<User>().get(seller)? {
            Some(v) => Some(v.data.id),
            None => self.get_user_by_username(seller)?.map(|p| p.id),
        };
        match id {
            Some(id) => {
                self.modify::<User, _>(&id, |u| u.sales_count += 1)?;
            }
            None => tracing::debug!(seller, "Sale stats skipped: seller is not a user"),
        }
        Ok(())
    }

    /// Undo [`MarketDb::record_purchase`].
    pub(crate) fn revert_purchase(&self, buyer_id: &str, amount: f64) -> Result<(), MarketError> {
        self.modify::<User, _>(buyer_id, |u| {
            u.purchases_count = u.purchases_count.saturating_sub(1);
            u.total_spent = (u.total_spent - amount).max(0.0);
        })?;
        Ok(())
    }

    /// Undo [`MarketDb::record_sale`].
    pub(crate) fn revert_sale(&self, seller: &str) -> Result<(), MarketError> {
        let id = match self.store.table::<User>().get(seller)? {
            Some(v) => Some(v.data.id),
            None => self.get_user_by_username(seller)?.map(|p| p.id),
        };
        if let Some(id) = id {
            self.modify::<User, _>(&id, |u| u.sales_count = u.sales_count.saturating_sub(1))?;
        }
        Ok(())
    }
}
