//! Site settings route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{SettingsUpdate, SettingsView, StatusResponse};
use crate::services::settings::{load_settings, save_settings};
use crate::state::AppState;

/// GET /api/settings
#[instrument(skip(_admin, state))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<SettingsView>> {
    Ok(Json(load_settings(state.store()).await?))
}

/// PUT /api/settings
#[instrument(skip(_admin, state, body))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<SettingsUpdate>,
) -> Result<Json<StatusResponse>> {
    save_settings(state.store(), body).await?;
    Ok(Json(StatusResponse::OK))
}
