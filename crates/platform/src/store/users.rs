//! User repository.

use serde_json::json;
use tracing::instrument;

use coronda_core::{SaleId, StoredUser, UserId};

use super::{Collection, DocumentStore, StoreError};

/// Repository for the `users` collection.
///
/// User documents are keyed by the identity provider's UID.
pub struct UserRepository<'a> {
    users: Collection<'a, StoredUser>,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            users: Collection::new(store),
        }
    }

    /// Get a user by UID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the document is malformed.
    pub async fn get(&self, id: &UserId) -> Result<Option<StoredUser>, StoreError> {
        self.users.get(id.as_str()).await
    }

    /// Find a user by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if listing users fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, StoreError> {
        let email = email.trim();
        Ok(self
            .users
            .list()
            .await?
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    /// Every user document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    pub async fn list(&self) -> Result<Vec<StoredUser>, StoreError> {
        self.users.list().await
    }

    /// Users without the admin flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    pub async fn list_customers(&self) -> Result<Vec<StoredUser>, StoreError> {
        Ok(self
            .users
            .list()
            .await?
            .into_iter()
            .filter(|u| !u.is_admin)
            .collect())
    }

    /// Create or merge a user document under its UID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn save(&self, user: &StoredUser) -> Result<(), StoreError> {
        self.users.upsert(user).await
    }

    /// Record that the identity provider reports the email verified.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn mark_verified(&self, id: &UserId) -> Result<(), StoreError> {
        self.users
            .merge(id.as_str(), &json!({ "isVerified": true }))
            .await
    }

    /// Set or clear the admin flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn set_admin(&self, id: &UserId, is_admin: bool) -> Result<(), StoreError> {
        self.users
            .merge(id.as_str(), &json!({ "isAdmin": is_admin }))
            .await
    }

    /// Append a sale id to the user's `saleIds`.
    ///
    /// Read-modify-merge: two concurrent checkouts by the same user can lose
    /// one of the ids.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user document does not exist.
    #[instrument(skip(self), fields(user_id = %id, sale_id = %sale_id))]
    pub async fn append_sale_id(&self, id: &UserId, sale_id: &SaleId) -> Result<(), StoreError> {
        let user = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;

        let mut sale_ids = user.sale_ids().to_vec();
        if !sale_ids.contains(sale_id) {
            sale_ids.push(sale_id.clone());
        }

        self.users
            .merge(id.as_str(), &json!({ "saleIds": sale_ids }))
            .await
    }
}
