//! Authentication route handlers.
//!
//! Credentials are checked by the identity provider; the session keeps the
//! resolved user and the provider tokens.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use coronda_core::SessionUser;
use coronda_platform::SessionState;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    OptionalAuth, clear_current_user, current_tokens, refresh_current_user, set_current_user,
};
use crate::models::{
    LoginRequest, RegisterRequest, RegisterResponse, SessionResponse, StatusResponse,
};
use crate::state::AppState;

const VERIFY_EMAIL_MESSAGE: &str =
    "¡Registro exitoso! Te enviamos un email para verificar tu cuenta antes de iniciar sesión.";

/// Create an account and send the verification email.
///
/// The new account is not signed in.
///
/// POST /api/auth/register
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let user = state
        .auth()
        .register(&body.name, &body.email, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: VERIFY_EMAIL_MESSAGE,
            email: user.email,
        }),
    ))
}

/// POST /api/auth/login
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let outcome = state.auth().login(&body.email, &body.password).await?;

    set_current_user(&session, &outcome.user, &outcome.tokens).await?;
    set_sentry_user(&outcome.user.id, Some(&outcome.user.email));
    tracing::info!(user_id = %outcome.user.id, "Customer logged in");

    Ok(Json(SessionResponse {
        user: Some(outcome.user),
    }))
}

/// POST /api/auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<StatusResponse>> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Json(StatusResponse::OK))
}

/// Current user, re-checked against the identity provider.
///
/// An expired id token is refreshed and the new pair stored. A revoked
/// refresh token or missing user document signs the session out. When the
/// provider or store is unreachable the stored user is kept.
///
/// GET /api/auth/session
#[instrument(skip(state, session, current))]
pub async fn session(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
) -> Result<Json<SessionResponse>> {
    let Some(tokens) = current_tokens(&session).await else {
        if current.is_some() {
            clear_current_user(&session).await?;
        }
        return Ok(Json(SessionResponse { user: None }));
    };

    let user: Option<SessionUser> = match state.auth().sync(&tokens).await {
        Ok(SessionState::SignedIn { user, tokens }) => {
            refresh_current_user(&session, &user, &tokens).await?;
            Some(user)
        }
        Ok(SessionState::SignedOut) => {
            clear_current_user(&session).await?;
            clear_sentry_user();
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session re-check failed, keeping stored user");
            current
        }
    };

    Ok(Json(SessionResponse { user }))
}
