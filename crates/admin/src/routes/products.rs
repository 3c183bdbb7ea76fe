//! Product management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coronda_core::{Product, ProductFields, ProductId};
use coronda_platform::store::ProductRepository;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::catalog::validate_product;
use crate::state::AppState;

/// GET /api/products
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.store()).list().await?))
}

/// POST /api/products
#[instrument(skip(_admin, state, fields), fields(name = %fields.name))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(fields): Json<ProductFields>,
) -> Result<(StatusCode, Json<Product>)> {
    validate_product(&fields)?;
    let product = ProductRepository::new(state.store()).create(fields).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Save the form fields onto an existing product.
///
/// Reviews and the featured flag are left as they are.
///
/// PUT /api/products/{id}
#[instrument(skip(_admin, state, fields), fields(product_id = %id))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(fields): Json<ProductFields>,
) -> Result<Json<Product>> {
    validate_product(&fields)?;
    let product = ProductRepository::new(state.store())
        .update(&id, &fields)
        .await?;
    tracing::info!("Product updated");
    Ok(Json(product))
}

/// DELETE /api/products/{id}
#[instrument(skip(_admin, state), fields(product_id = %id))]
pub async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let products = ProductRepository::new(state.store());
    if products.get(&id).await?.is_none() {
        return Err(AppError::NotFound("Producto no encontrado.".to_string()));
    }
    products.delete(&id).await?;
    tracing::info!("Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
