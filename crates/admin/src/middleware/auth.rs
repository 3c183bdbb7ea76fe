//! Authentication extractors for admin.
//!
//! Every back-office route except login takes [`RequireAdmin`], which
//! re-reads the user document on each request so a revoked admin loses
//! access immediately.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use coronda_core::SessionUser;
use coronda_platform::store::UserRepository;
use coronda_platform::{SessionTokens, StoreError};

use crate::error::AppError;
use crate::models::session_keys;
use crate::state::AppState;

/// Extractor that requires a signed-in admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hola, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub SessionUser);

/// Error returned when admin authentication is required.
pub enum AdminAuthRejection {
    /// Nobody is signed in.
    Unauthorized,
    /// Signed in, but not as an admin.
    Forbidden,
    /// The user document could not be read.
    Store(StoreError),
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Debes iniciar sesión." })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Acceso restringido a administradores." })),
            )
                .into_response(),
            Self::Store(e) => AppError::from(e).into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin: SessionUser = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        if !admin.is_admin {
            return Err(AdminAuthRejection::Forbidden);
        }

        let state = AppState::from_ref(state);
        let doc = UserRepository::new(state.store())
            .get(&admin.id)
            .await
            .map_err(AdminAuthRejection::Store)?;

        match doc {
            Some(doc) if doc.is_admin => Ok(Self(admin)),
            _ => {
                tracing::warn!(user_id = %admin.id, "Admin access revoked, clearing session");
                if let Err(e) = clear_current_admin(session).await {
                    tracing::warn!(error = %e, "Failed to clear revoked admin session");
                }
                Err(AdminAuthRejection::Forbidden)
            }
        }
    }
}

/// Extractor that optionally gets the current admin.
pub struct OptionalAdmin(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SessionUser>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten()
                .filter(|user| user.is_admin),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Store the signed-in admin and their provider tokens, cycling the
/// session id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &SessionUser,
    tokens: &SessionTokens,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await?;
    session.insert(session_keys::TOKENS, tokens).await
}

/// Replace the stored admin and tokens after a re-sync.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn refresh_current_admin(
    session: &Session,
    admin: &SessionUser,
    tokens: &SessionTokens,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await?;
    session.insert(session_keys::TOKENS, tokens).await
}

/// The stored provider tokens, if any.
pub async fn current_admin_tokens(session: &Session) -> Option<SessionTokens> {
    session
        .get::<SessionTokens>(session_keys::TOKENS)
        .await
        .ok()
        .flatten()
}

/// Clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<SessionUser>(session_keys::CURRENT_ADMIN)
        .await?;
    session
        .remove::<SessionTokens>(session_keys::TOKENS)
        .await?;
    Ok(())
}
