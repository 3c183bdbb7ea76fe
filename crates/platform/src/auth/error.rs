//! Authentication error types.

use thiserror::Error;

use crate::identity::IdentityError;
use crate::store::StoreError;

/// Errors that can occur during authentication operations.
///
/// Display strings of the user-facing variants are shown to shoppers as-is.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("El email no es válido.")]
    InvalidEmail(#[from] coronda_core::EmailError),

    /// Name left blank on registration.
    #[error("El nombre es requerido.")]
    MissingName,

    /// Password shorter than the minimum.
    #[error("La contraseña debe tener al menos {0} caracteres.")]
    WeakPassword(usize),

    /// Wrong email or password.
    #[error("La contraseña o el email son incorrectos.")]
    InvalidCredentials,

    /// An account already exists for the email.
    #[error("Ya existe una cuenta con este email.")]
    EmailInUse,

    /// Email not verified yet.
    #[error("Tu cuenta no ha sido verificada. Por favor, revisa tu email.")]
    NotVerified,

    /// Identity exists but no user document was found.
    #[error("No se encontró el registro de usuario. Contacta a soporte.")]
    UserRecordMissing,

    /// Signed in, but the account lacks admin rights.
    #[error("Acceso restringido a administradores.")]
    NotAdmin,

    /// Provider throttled the client.
    #[error("Demasiados intentos. Inténtalo de nuevo más tarde.")]
    RateLimited,

    /// Any other identity provider failure.
    #[error("identity provider error: {0}")]
    Identity(IdentityError),

    /// Document store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials | IdentityError::UserNotFound => {
                Self::InvalidCredentials
            }
            IdentityError::EmailInUse => Self::EmailInUse,
            IdentityError::WeakPassword => Self::WeakPassword(super::MIN_PASSWORD_LENGTH),
            IdentityError::RateLimited => Self::RateLimited,
            other => Self::Identity(other),
        }
    }
}
