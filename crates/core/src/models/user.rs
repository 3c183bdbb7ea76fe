//! User documents and the signed-in session user.

use serde::{Deserialize, Serialize};

use crate::types::{SaleId, UserId};

/// A user document in the `users` collection, keyed by the identity UID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_ids: Option<Vec<SaleId>>,
}

impl StoredUser {
    /// The user's sale ids, empty when the document has none.
    #[must_use]
    pub fn sale_ids(&self) -> &[SaleId] {
        self.sale_ids.as_deref().unwrap_or_default()
    }
}

/// The user mirrored into the server-side session after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_verified: bool,
}

impl SessionUser {
    /// Build the session view of a stored user.
    #[must_use]
    pub fn from_stored(user: &StoredUser, verified: bool) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            is_verified: verified || user.is_verified.unwrap_or(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sale_ids_reads_as_empty() {
        let user: StoredUser = serde_json::from_value(serde_json::json!({
            "id": "uid-1",
            "name": "Lucía",
            "email": "lucia@example.com",
            "isAdmin": false
        }))
        .unwrap();
        assert!(user.sale_ids().is_empty());
        assert!(user.is_verified.is_none());
    }

    #[test]
    fn test_session_user_reflects_provider_verification() {
        let user = StoredUser {
            id: UserId::new("uid-2"),
            name: "Tomás".to_owned(),
            email: "tomas@example.com".to_owned(),
            is_admin: false,
            is_verified: Some(false),
            sale_ids: None,
        };
        assert!(SessionUser::from_stored(&user, true).is_verified);
        assert!(!SessionUser::from_stored(&user, false).is_verified);
    }
}
