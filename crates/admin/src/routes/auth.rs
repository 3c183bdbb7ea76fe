//! Admin sign-in.
//!
//! Passwords are checked by the identity provider through the shared
//! `AuthService`; only accounts flagged as admin get a back-office session.

use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use coronda_core::SessionUser;
use coronda_platform::{AuthError, SessionState};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    OptionalAdmin, clear_current_admin, current_admin_tokens, refresh_current_admin,
    set_current_admin,
};
use crate::models::{LoginRequest, SessionResponse, StatusResponse};
use crate::state::AppState;

/// POST /api/auth/login
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let outcome = state.auth().login(&body.email, &body.password).await?;

    if !outcome.user.is_admin {
        tracing::warn!(user_id = %outcome.user.id, "Non-admin sign-in attempt");
        return Err(AuthError::NotAdmin.into());
    }

    set_current_admin(&session, &outcome.user, &outcome.tokens).await?;
    set_sentry_user(&outcome.user.id, Some(&outcome.user.email));
    tracing::info!(user_id = %outcome.user.id, "Admin logged in");

    Ok(Json(SessionResponse {
        user: Some(outcome.user),
    }))
}

/// POST /api/auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<StatusResponse>> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Json(StatusResponse::OK))
}

/// Current admin, re-checked against the identity provider and the user
/// document.
///
/// A revoked admin flag, revoked tokens or a missing user document sign the
/// session out. When the provider or store is unreachable the stored admin
/// is kept.
///
/// GET /api/auth/session
#[instrument(skip(state, session, current))]
pub async fn session(
    State(state): State<AppState>,
    session: Session,
    OptionalAdmin(current): OptionalAdmin,
) -> Result<Json<SessionResponse>> {
    let Some(tokens) = current_admin_tokens(&session).await else {
        if current.is_some() {
            clear_current_admin(&session).await?;
        }
        return Ok(Json(SessionResponse { user: None }));
    };

    let user: Option<SessionUser> = match state.auth().sync(&tokens).await {
        Ok(SessionState::SignedIn { user, tokens }) if user.is_admin => {
            refresh_current_admin(&session, &user, &tokens).await?;
            Some(user)
        }
        Ok(_) => {
            clear_current_admin(&session).await?;
            clear_sentry_user();
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Admin session re-check failed, keeping stored admin");
            current
        }
    };

    Ok(Json(SessionResponse { user }))
}
