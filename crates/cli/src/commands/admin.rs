//! Admin account management.
//!
//! # Usage
//!
//! ```bash
//! coronda-cli admin grant -e ana@example.com
//! coronda-cli admin revoke -e ana@example.com
//! ```
//!
//! The account must already exist; this only flips `isAdmin` on its user
//! document.

use thiserror::Error;

use coronda_platform::StoreError;
use coronda_platform::config::{ConfigError, get_database_url, load_dotenv};
use coronda_platform::db::create_pool;
use coronda_platform::store::{DocumentStore, PgDocumentStore, UserRepository};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("No user found with email: {0}")]
    UserNotFound(String),
}

/// Grant or revoke admin rights for the user with this email.
///
/// # Errors
///
/// Returns an error if the database is unreachable or no user has the
/// email.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), AdminError> {
    load_dotenv();
    let pool = create_pool(&get_database_url("DATABASE_URL")?).await?;
    let store = PgDocumentStore::new(pool);
    apply(&store, email, is_admin).await
}

async fn apply(store: &dyn DocumentStore, email: &str, is_admin: bool) -> Result<(), AdminError> {
    let users = UserRepository::new(store);
    let user = users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_owned()))?;

    users.set_admin(&user.id, is_admin).await?;
    tracing::info!(user_id = %user.id, is_admin, "Admin flag updated");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coronda_platform::store::{MemoryDocumentStore, collections};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_grant_and_revoke() {
        let store = MemoryDocumentStore::new();
        store
            .seed(
                collections::USERS,
                "u1",
                json!({"name": "Ana", "email": "ana@example.com", "isAdmin": false}),
            )
            .await;

        apply(&store, "ana@example.com", true).await.unwrap();
        assert_eq!(store.raw(collections::USERS, "u1").await.unwrap()["isAdmin"], json!(true));

        apply(&store, "ana@example.com", false).await.unwrap();
        assert_eq!(store.raw(collections::USERS, "u1").await.unwrap()["isAdmin"], json!(false));
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let store = MemoryDocumentStore::new();
        let err = apply(&store, "nadie@example.com", true).await.unwrap_err();
        assert!(matches!(err, AdminError::UserNotFound(_)));
    }
}
