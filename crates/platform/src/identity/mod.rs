//! Identity provider.
//!
//! Passwords and email verification live with the managed identity provider.
//! The shop only keeps the provider's UID as the user document id.

mod firebase;
#[cfg(any(test, feature = "test-util"))]
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coronda_core::UserId;

pub use firebase::{FirebaseConfig, FirebaseIdentity};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryIdentity;

/// An authenticated identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub uid: UserId,
    pub email: String,
    pub email_verified: bool,
    /// Short-lived token identifying this sign-in.
    pub id_token: String,
    /// Long-lived token that mints new id tokens. Only sign-up and
    /// sign-in answers carry one.
    pub refresh_token: Option<String>,
}

impl IdentityUser {
    /// Tokens to keep in the session after a sign-in.
    #[must_use]
    pub fn session_tokens(&self) -> SessionTokens {
        SessionTokens {
            id_token: self.id_token.clone(),
            refresh_token: self.refresh_token.clone().unwrap_or_default(),
        }
    }
}

/// Provider tokens kept in the server-side session.
///
/// The id token expires after an hour; the refresh token is exchanged for
/// a new pair when that happens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub id_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Errors reported by the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No account exists for the email.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password (or unknown email, when the provider hides which).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for the email.
    #[error("email already in use")]
    EmailInUse,

    /// Password rejected by the provider's policy.
    #[error("weak password")]
    WeakPassword,

    /// The account was disabled by an administrator.
    #[error("account disabled")]
    Disabled,

    /// Too many attempts from this client.
    #[error("too many attempts, try again later")]
    RateLimited,

    /// The id or refresh token is expired, revoked or malformed.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Any other provider error code.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl IdentityError {
    /// Map a provider error message (e.g. `"WEAK_PASSWORD : Password should
    /// be at least 6 characters"`) to an error variant.
    #[must_use]
    pub fn from_code(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();
        match code {
            "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => Self::InvalidCredentials,
            "EMAIL_EXISTS" => Self::EmailInUse,
            "USER_DISABLED" => Self::Disabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::RateLimited,
            "INVALID_ID_TOKEN"
            | "TOKEN_EXPIRED"
            | "USER_NOT_FOUND"
            | "INVALID_REFRESH_TOKEN"
            | "MISSING_REFRESH_TOKEN" => Self::InvalidToken,
            c if c.starts_with("WEAK_PASSWORD") => Self::WeakPassword,
            _ => Self::Provider(code.to_owned()),
        }
    }
}

/// Operations the shop needs from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityUser, IdentityError>;

    /// Send the verification email for the signed-in account.
    async fn send_email_verification(&self, id_token: &str) -> Result<(), IdentityError>;

    /// Fetch the current state of the account behind a token.
    async fn lookup(&self, id_token: &str) -> Result<IdentityUser, IdentityError>;

    /// Exchange a refresh token for a fresh token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, IdentityError>;
}
