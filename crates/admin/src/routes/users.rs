//! Customer listing.

use axum::{Json, extract::State};
use tracing::instrument;

use coronda_core::StoredUser;
use coronda_platform::store::UserRepository;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Registered customers; admin accounts are left out.
///
/// GET /api/users
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredUser>>> {
    Ok(Json(
        UserRepository::new(state.store()).list_customers().await?,
    ))
}
