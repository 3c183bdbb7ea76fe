//! In-memory identity provider for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use coronda_core::UserId;

use super::{IdentityError, IdentityProvider, IdentityUser, SessionTokens};

struct Account {
    uid: UserId,
    email: String,
    password: String,
    verified: bool,
}

/// An [`IdentityProvider`] that keeps accounts in process memory.
///
/// Id tokens are `"token:{generation}:{uid}"` and refresh tokens are
/// `"refresh:{uid}"`. [`expire_tokens`](Self::expire_tokens) moves to the
/// next generation, which invalidates every id token issued so far the way
/// the hour-long provider expiry does. Verification emails are recorded so
/// tests can assert on them, and [`verify_email`](Self::verify_email)
/// stands in for the user clicking the link.
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Account>>,
    verification_emails: RwLock<Vec<String>>,
    generation: AtomicU64,
    refreshes: AtomicU64,
}

impl MemoryIdentity {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account directly.
    pub async fn add_account(&self, uid: &str, email: &str, password: &str, verified: bool) {
        self.accounts.write().await.insert(
            email.to_lowercase(),
            Account {
                uid: UserId::new(uid),
                email: email.to_owned(),
                password: password.to_owned(),
                verified,
            },
        );
    }

    /// Mark an account's email as verified.
    pub async fn verify_email(&self, email: &str) {
        if let Some(account) = self.accounts.write().await.get_mut(&email.to_lowercase()) {
            account.verified = true;
        }
    }

    /// Emails that were sent a verification link, in order.
    pub async fn verification_emails(&self) -> Vec<String> {
        self.verification_emails.read().await.clone()
    }

    /// The UID registered for an email.
    pub async fn uid_for(&self, email: &str) -> Option<UserId> {
        self.accounts
            .read()
            .await
            .get(&email.to_lowercase())
            .map(|a| a.uid.clone())
    }

    /// The id token a sign-in before any expiry returns for `uid`.
    #[must_use]
    pub fn token_for(uid: &UserId) -> String {
        Self::id_token(0, uid)
    }

    /// The token pair a sign-in before any expiry returns for `uid`.
    #[must_use]
    pub fn tokens_for(uid: &UserId) -> SessionTokens {
        SessionTokens {
            id_token: Self::token_for(uid),
            refresh_token: format!("refresh:{uid}"),
        }
    }

    /// Expire every id token issued so far. Refresh tokens stay valid.
    pub fn expire_tokens(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// How many times a refresh token was exchanged.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn id_token(generation: u64, uid: &UserId) -> String {
        format!("token:{generation}:{uid}")
    }

    fn current_tokens(&self, uid: &UserId) -> SessionTokens {
        SessionTokens {
            id_token: Self::id_token(self.generation.load(Ordering::SeqCst), uid),
            refresh_token: format!("refresh:{uid}"),
        }
    }

    fn to_user(&self, account: &Account) -> IdentityUser {
        let tokens = self.current_tokens(&account.uid);
        IdentityUser {
            uid: account.uid.clone(),
            email: account.email.clone(),
            email_verified: account.verified,
            id_token: tokens.id_token,
            refresh_token: Some(tokens.refresh_token),
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        if password.len() < 6 {
            return Err(IdentityError::WeakPassword);
        }
        let key = email.trim().to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(IdentityError::EmailInUse);
        }
        let account = Account {
            uid: UserId::new(format!("uid-{}", accounts.len() + 1)),
            email: email.trim().to_owned(),
            password: password.to_owned(),
            verified: false,
        };
        let user = self.to_user(&account);
        accounts.insert(key, account);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&email.trim().to_lowercase())
            .ok_or(IdentityError::UserNotFound)?;
        if account.password != password {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(self.to_user(account))
    }

    async fn send_email_verification(&self, id_token: &str) -> Result<(), IdentityError> {
        let user = self.lookup(id_token).await?;
        self.verification_emails.write().await.push(user.email);
        Ok(())
    }

    async fn lookup(&self, id_token: &str) -> Result<IdentityUser, IdentityError> {
        let (generation, uid) = id_token
            .strip_prefix("token:")
            .and_then(|rest| rest.split_once(':'))
            .ok_or(IdentityError::InvalidToken)?;
        if generation.parse::<u64>().ok() != Some(self.generation.load(Ordering::SeqCst)) {
            return Err(IdentityError::InvalidToken);
        }
        let accounts = self.accounts.read().await;
        let account = accounts
            .values()
            .find(|a| a.uid.as_str() == uid)
            .ok_or(IdentityError::InvalidToken)?;
        Ok(IdentityUser {
            refresh_token: None,
            id_token: id_token.to_owned(),
            ..self.to_user(account)
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, IdentityError> {
        let uid = refresh_token
            .strip_prefix("refresh:")
            .ok_or(IdentityError::InvalidToken)?;
        let accounts = self.accounts.read().await;
        let account = accounts
            .values()
            .find(|a| a.uid.as_str() == uid)
            .ok_or(IdentityError::InvalidToken)?;
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(self.current_tokens(&account.uid))
    }
}
