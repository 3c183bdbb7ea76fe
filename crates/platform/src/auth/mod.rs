//! Authentication service.
//!
//! Wraps the identity provider and the `users` collection into the three
//! flows both binaries need: registration, password login, and re-deriving
//! the session user from a stored id token.

mod error;

pub use error::AuthError;

use tracing::instrument;

use coronda_core::{Email, SessionUser, StoredUser};

use crate::identity::{IdentityError, IdentityProvider, IdentityUser, SessionTokens};
use crate::store::{DocumentStore, UserRepository};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Default email that is auto-provisioned as admin on first login.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@store.com";

/// A successful login: the session user and the provider tokens to keep.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: SessionUser,
    pub tokens: SessionTokens,
}

/// Result of re-checking a stored session against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The session user, refreshed from the user document, and the tokens
    /// to store back. They differ from the stored ones after a refresh.
    SignedIn {
        user: SessionUser,
        tokens: SessionTokens,
    },
    /// The session must be cleared.
    SignedOut,
}

/// Authentication service.
pub struct AuthService<'a> {
    identity: &'a dyn IdentityProvider,
    users: UserRepository<'a>,
    admin_email: &'a str,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(
        store: &'a dyn DocumentStore,
        identity: &'a dyn IdentityProvider,
        admin_email: &'a str,
    ) -> Self {
        Self {
            identity,
            users: UserRepository::new(store),
            admin_email,
        }
    }

    fn is_admin_email(&self, email: &Email) -> bool {
        email.matches(self.admin_email)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new customer account.
    ///
    /// Creates the identity, writes the user document and sends the
    /// verification email. The new account is not signed in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` for bad input, `AuthError::EmailInUse` if
    /// the account exists, and `AuthError::Store` if the document write fails.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<StoredUser, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let identity = self.identity.sign_up(email.as_str(), password).await?;

        let user = StoredUser {
            id: identity.uid.clone(),
            name: name.to_owned(),
            email: email.into_inner(),
            is_admin: false,
            is_verified: Some(false),
            sale_ids: None,
        };
        self.users.save(&user).await?;

        self.identity
            .send_email_verification(&identity.id_token)
            .await?;

        tracing::info!(user_id = %user.id, "Registered new user, verification email sent");
        Ok(user)
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// The configured admin email is provisioned on its first login: the
    /// identity is created if missing, and so is its admin user document.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong password,
    /// `AuthError::NotVerified` for customers who have not clicked the
    /// verification link, and `AuthError::UserRecordMissing` when the
    /// identity has no user document.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = Email::parse(email)?;
        let is_admin_email = self.is_admin_email(&email);

        let identity = match self.identity.sign_in(email.as_str(), password).await {
            Ok(identity) => identity,
            Err(IdentityError::UserNotFound) if is_admin_email => {
                tracing::info!("Provisioning admin identity on first login");
                self.identity.sign_up(email.as_str(), password).await?
            }
            Err(e) => return Err(e.into()),
        };

        let mut doc = self.users.get(&identity.uid).await?;

        if doc.is_none() && is_admin_email {
            let admin = StoredUser {
                id: identity.uid.clone(),
                name: "Admin".to_owned(),
                email: email.as_str().to_owned(),
                is_admin: true,
                is_verified: None,
                sale_ids: None,
            };
            self.users.save(&admin).await?;
            tracing::info!(user_id = %admin.id, "Created admin user document");
            doc = Some(admin);
        }

        let Some(doc) = doc else {
            tracing::warn!(user_id = %identity.uid, "Identity has no user document");
            return Err(AuthError::UserRecordMissing);
        };

        if !doc.is_admin && !identity.email_verified {
            return Err(AuthError::NotVerified);
        }

        let user = self.resolve(&doc, &identity).await;
        Ok(LoginOutcome {
            user,
            tokens: identity.session_tokens(),
        })
    }

    // =========================================================================
    // Session sync
    // =========================================================================

    /// Re-derive the session user from the stored provider tokens.
    ///
    /// An expired id token is exchanged through the refresh token first.
    /// A revoked refresh token, a missing user document, or an unverified
    /// customer all yield [`SessionState::SignedOut`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` or `AuthError::Identity` when the backing
    /// services fail; the caller keeps the current session in that case.
    #[instrument(skip_all)]
    pub async fn sync(&self, tokens: &SessionTokens) -> Result<SessionState, AuthError> {
        let Some((identity, tokens)) = self.current_identity(tokens).await? else {
            return Ok(SessionState::SignedOut);
        };

        let Some(doc) = self.users.get(&identity.uid).await? else {
            return Ok(SessionState::SignedOut);
        };

        if identity.email_verified || doc.is_admin {
            let user = self.resolve(&doc, &identity).await;
            Ok(SessionState::SignedIn { user, tokens })
        } else {
            Ok(SessionState::SignedOut)
        }
    }

    /// Look up the identity behind `tokens`, refreshing an expired id token.
    /// `None` means the tokens can no longer be used.
    async fn current_identity(
        &self,
        tokens: &SessionTokens,
    ) -> Result<Option<(IdentityUser, SessionTokens)>, AuthError> {
        match self.identity.lookup(&tokens.id_token).await {
            Ok(identity) => return Ok(Some((identity, tokens.clone()))),
            Err(IdentityError::InvalidToken) => {}
            Err(e) => return Err(e.into()),
        }

        let fresh = match self.identity.refresh(&tokens.refresh_token).await {
            Ok(fresh) => fresh,
            Err(IdentityError::InvalidToken | IdentityError::Disabled) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Refreshed expired id token");

        match self.identity.lookup(&fresh.id_token).await {
            Ok(identity) => Ok(Some((identity, fresh))),
            Err(IdentityError::InvalidToken) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Build the session user, writing `isVerified: true` back to the user
    /// document when the provider reports verification and the document
    /// does not yet. A failed write is logged and ignored.
    async fn resolve(&self, doc: &StoredUser, identity: &IdentityUser) -> SessionUser {
        if identity.email_verified
            && doc.is_verified != Some(true)
            && let Err(e) = self.users.mark_verified(&doc.id).await
        {
            tracing::warn!(user_id = %doc.id, error = %e, "Failed to record email verification");
        }
        SessionUser::from_stored(doc, identity.email_verified)
    }
}

/// Validate password length.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coronda_core::UserId;

    use super::*;
    use crate::identity::MemoryIdentity;
    use crate::store::MemoryDocumentStore;

    struct Fixture {
        store: MemoryDocumentStore,
        identity: MemoryIdentity,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: MemoryDocumentStore::new(),
                identity: MemoryIdentity::new(),
            }
        }

        fn auth(&self) -> AuthService<'_> {
            AuthService::new(&self.store, &self.identity, DEFAULT_ADMIN_EMAIL)
        }
    }

    #[tokio::test]
    async fn test_register_writes_doc_and_sends_verification() {
        let fx = Fixture::new();
        let user = fx
            .auth()
            .register("Valentina Ruiz", "vale@example.com", "mate1234")
            .await
            .unwrap();

        assert!(!user.is_admin);
        assert_eq!(user.is_verified, Some(false));
        assert_eq!(fx.identity.verification_emails().await, vec!["vale@example.com"]);
        assert!(fx.store.raw("users", user.id.as_str()).await.is_some());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let fx = Fixture::new();
        let auth = fx.auth();
        assert!(matches!(
            auth.register("  ", "a@example.com", "123456").await,
            Err(AuthError::MissingName)
        ));
        assert!(matches!(
            auth.register("Ana", "not-an-email", "123456").await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.register("Ana", "a@example.com", "12345").await,
            Err(AuthError::WeakPassword(6))
        ));
        assert_eq!(fx.store.count("users").await, 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let fx = Fixture::new();
        fx.auth().register("Ana", "a@example.com", "123456").await.unwrap();
        assert!(matches!(
            fx.auth().register("Ana", "a@example.com", "123456").await,
            Err(AuthError::EmailInUse)
        ));
    }

    #[tokio::test]
    async fn test_unverified_user_cannot_log_in() {
        let fx = Fixture::new();
        fx.auth().register("Ana", "a@example.com", "123456").await.unwrap();

        assert!(matches!(
            fx.auth().login("a@example.com", "123456").await,
            Err(AuthError::NotVerified)
        ));

        fx.identity.verify_email("a@example.com").await;
        let outcome = fx.auth().login("a@example.com", "123456").await.unwrap();
        assert!(outcome.user.is_verified);
        assert!(!outcome.user.is_admin);

        let uid = fx.identity.uid_for("a@example.com").await.unwrap();
        let doc = fx.store.raw("users", uid.as_str()).await.unwrap();
        assert_eq!(doc.get("isVerified"), Some(&serde_json::json!(true)));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let fx = Fixture::new();
        fx.identity
            .add_account("u1", "b@example.com", "correcto", true)
            .await;
        assert!(matches!(
            fx.auth().login("b@example.com", "incorrecto").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_admin_first_login_auto_provisions() {
        let fx = Fixture::new();
        let outcome = fx.auth().login("admin@store.com", "admin123").await.unwrap();

        assert!(outcome.user.is_admin);
        assert_eq!(outcome.user.name, "Admin");
        let uid = fx.identity.uid_for("admin@store.com").await.unwrap();
        assert_eq!(outcome.user.id, uid);

        // Second login reuses the identity and document.
        let again = fx.auth().login("ADMIN@store.com", "admin123").await.unwrap();
        assert_eq!(again.user.id, uid);
        assert_eq!(fx.store.count("users").await, 1);
    }

    #[tokio::test]
    async fn test_unknown_non_admin_email() {
        let fx = Fixture::new();
        assert!(matches!(
            fx.auth().login("nadie@example.com", "123456").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(fx.identity.uid_for("nadie@example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_identity_without_document() {
        let fx = Fixture::new();
        fx.identity
            .add_account("orphan", "orphan@example.com", "123456", true)
            .await;
        assert!(matches!(
            fx.auth().login("orphan@example.com", "123456").await,
            Err(AuthError::UserRecordMissing)
        ));
    }

    #[tokio::test]
    async fn test_sync_states() {
        let fx = Fixture::new();
        let user = fx.auth().register("Ana", "a@example.com", "123456").await.unwrap();
        let tokens = MemoryIdentity::tokens_for(&user.id);

        // Unverified customer
        assert_eq!(fx.auth().sync(&tokens).await.unwrap(), SessionState::SignedOut);

        fx.identity.verify_email("a@example.com").await;
        let SessionState::SignedIn { user: session, tokens: kept } =
            fx.auth().sync(&tokens).await.unwrap()
        else {
            panic!("expected signed in");
        };
        assert_eq!(session.id, user.id);
        assert_eq!(kept, tokens);
        assert_eq!(fx.identity.refresh_count(), 0);

        // Document removed
        fx.store.delete("users", user.id.as_str()).await.unwrap();
        assert_eq!(fx.auth().sync(&tokens).await.unwrap(), SessionState::SignedOut);

        // Garbage tokens
        let garbage = SessionTokens {
            id_token: "nope".to_owned(),
            refresh_token: "nope".to_owned(),
        };
        assert_eq!(fx.auth().sync(&garbage).await.unwrap(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_sync_refreshes_expired_id_token() {
        let fx = Fixture::new();
        fx.auth().register("Ana", "a@example.com", "123456").await.unwrap();
        fx.identity.verify_email("a@example.com").await;
        let outcome = fx.auth().login("a@example.com", "123456").await.unwrap();

        fx.identity.expire_tokens();

        let SessionState::SignedIn { user, tokens } =
            fx.auth().sync(&outcome.tokens).await.unwrap()
        else {
            panic!("expected the session to survive an expired id token");
        };
        assert_eq!(user.id, outcome.user.id);
        assert_ne!(tokens.id_token, outcome.tokens.id_token);
        assert_eq!(fx.identity.refresh_count(), 1);

        // The refreshed pair is good without another exchange.
        assert!(matches!(
            fx.auth().sync(&tokens).await.unwrap(),
            SessionState::SignedIn { .. }
        ));
        assert_eq!(fx.identity.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_sync_signs_out_without_usable_refresh_token() {
        let fx = Fixture::new();
        fx.auth().register("Ana", "a@example.com", "123456").await.unwrap();
        fx.identity.verify_email("a@example.com").await;
        let mut tokens = fx.auth().login("a@example.com", "123456").await.unwrap().tokens;
        tokens.refresh_token = "refresh:revocado".to_owned();

        fx.identity.expire_tokens();
        assert_eq!(fx.auth().sync(&tokens).await.unwrap(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_sync_keeps_unverified_admin() {
        let fx = Fixture::new();
        fx.identity
            .add_account("adm", "boss@example.com", "123456", false)
            .await;
        fx.store
            .seed(
                "users",
                "adm",
                serde_json::json!({"name": "Boss", "email": "boss@example.com", "isAdmin": true}),
            )
            .await;
        let state = fx
            .auth()
            .sync(&MemoryIdentity::tokens_for(&UserId::new("adm")))
            .await
            .unwrap();
        assert!(matches!(state, SessionState::SignedIn { user, .. } if user.is_admin));
    }
}
