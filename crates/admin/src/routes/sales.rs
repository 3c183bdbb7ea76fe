//! Sales route handlers, including product suggestions for a buyer.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coronda_core::{Sale, SaleId};
use coronda_platform::store::{ProductRepository, SaleRepository};

use crate::claude::suggest_products;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{SaleStatusRequest, SuggestionsResponse};
use crate::state::AppState;

fn sale_not_found() -> AppError {
    AppError::NotFound("Venta no encontrada.".to_string())
}

/// Sales, newest first.
///
/// GET /api/sales
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Sale>>> {
    Ok(Json(SaleRepository::new(state.store()).list().await?))
}

/// GET /api/sales/{id}
#[instrument(skip(_admin, state), fields(sale_id = %id))]
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<SaleId>,
) -> Result<Json<Sale>> {
    SaleRepository::new(state.store())
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(sale_not_found)
}

/// DELETE /api/sales/{id}
#[instrument(skip(_admin, state), fields(sale_id = %id))]
pub async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<SaleId>,
) -> Result<StatusCode> {
    let sales = SaleRepository::new(state.store());
    if sales.get(&id).await?.is_none() {
        return Err(sale_not_found());
    }
    sales.delete(&id).await?;
    tracing::info!("Sale deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/sales/{id}
#[instrument(skip(_admin, state, body), fields(sale_id = %id, status = %body.status))]
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<SaleId>,
    Json(body): Json<SaleStatusRequest>,
) -> Result<Json<Sale>> {
    let sale = SaleRepository::new(state.store())
        .set_status(&id, body.status)
        .await?;
    tracing::info!("Sale status updated");
    Ok(Json(sale))
}

/// Up to three catalog products to offer the buyer of a sale.
///
/// GET /api/sales/{id}/suggestions
#[instrument(skip(_admin, state), fields(sale_id = %id))]
pub async fn suggestions(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<SaleId>,
) -> Result<Json<SuggestionsResponse>> {
    let Some(model) = state.model() else {
        return Err(AppError::Unavailable(
            "Las sugerencias no están configuradas.".to_string(),
        ));
    };

    let sale = SaleRepository::new(state.store())
        .get(&id)
        .await?
        .ok_or_else(sale_not_found)?;
    let catalog = ProductRepository::new(state.store()).list().await?;

    let suggestions = suggest_products(model, &sale.items, &catalog).await?;
    Ok(Json(SuggestionsResponse { suggestions }))
}
