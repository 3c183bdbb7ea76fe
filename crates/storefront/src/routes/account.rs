//! Account route handlers.
//!
//! These routes require a signed-in shopper.

use axum::{Json, extract::State};
use tracing::instrument;

use coronda_core::{Sale, SessionUser};
use coronda_platform::store::{SaleRepository, UserRepository};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// GET /api/account
pub async fn index(RequireAuth(user): RequireAuth) -> Json<SessionUser> {
    Json(user)
}

/// Order history: the sales referenced by the user document, newest first.
///
/// GET /api/account/sales
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn sales(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Sale>>> {
    let Some(stored) = UserRepository::new(state.store()).get(&user.id).await? else {
        return Ok(Json(Vec::new()));
    };
    let sales = SaleRepository::new(state.store())
        .find_for_user(&stored)
        .await?;
    Ok(Json(sales))
}
