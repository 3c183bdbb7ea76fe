//! Catalog and site content route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use coronda_core::{AboutData, Category, Product, ProductId, ShippingSettings, SliderItem};
use coronda_platform::store::{ProductRepository, SettingsRepository};

use crate::error::{AppError, Result};
use crate::models::{ProductDetail, ProductQuery};
use crate::state::AppState;

/// List products, optionally filtered.
///
/// GET /api/products?category=&search=
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state
        .catalog()
        .search(query.category.as_deref(), query.search.as_deref())
        .await?;
    Ok(Json(products))
}

/// Product detail.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = ProductRepository::new(state.store())
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Producto no encontrado.".to_string()))?;
    Ok(Json(ProductDetail::from(product)))
}

/// GET /api/categories
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().categories().await?))
}

/// Featured products followed by advertisements.
///
/// GET /api/slider
#[instrument(skip(state))]
pub async fn slider(State(state): State<AppState>) -> Result<Json<Vec<SliderItem>>> {
    Ok(Json(state.catalog().slider().await?))
}

/// "About us" content; the built-in default when unset or unreadable.
///
/// GET /api/about
#[instrument(skip(state))]
pub async fn about(State(state): State<AppState>) -> Json<AboutData> {
    let about = match SettingsRepository::new(state.store()).about_or_default().await {
        Ok(about) => about,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load about content, using default");
            AboutData::default()
        }
    };
    Json(about)
}

/// Shipping cost.
///
/// GET /api/shipping
#[instrument(skip(state))]
pub async fn shipping(State(state): State<AppState>) -> Json<ShippingSettings> {
    Json(ShippingSettings {
        cost: state.checkout().shipping_cost().await,
    })
}
