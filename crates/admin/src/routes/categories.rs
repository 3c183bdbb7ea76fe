//! Category route handlers.
//!
//! Products refer to categories by name, so a rename does not follow
//! through to existing products, and a category still named by a product
//! cannot be deleted.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coronda_core::{Category, CategoryId};
use coronda_platform::store::CategoryRepository;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{CategoryRequest, SaveCategoriesRequest};
use crate::services::catalog::{category_name, save_categories};
use crate::state::AppState;

/// GET /api/categories
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.store()).list().await?))
}

/// POST /api/categories
#[instrument(skip(_admin, state, body))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let name = category_name(&body.name)?;
    let category = CategoryRepository::new(state.store()).create(name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
#[instrument(skip(_admin, state, body), fields(category_id = %id))]
pub async fn rename(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<Category>> {
    let name = category_name(&body.name)?;
    let categories = CategoryRepository::new(state.store());
    if categories.get(&id).await?.is_none() {
        return Err(AppError::NotFound("Categoría no encontrada.".to_string()));
    }

    let category = Category {
        id,
        name: name.to_string(),
    };
    categories.upsert(&category).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
#[instrument(skip(_admin, state), fields(category_id = %id))]
pub async fn destroy(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.store()).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the whole list from the category dialog.
///
/// PUT /api/categories
#[instrument(skip(_admin, state, body))]
pub async fn save_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<SaveCategoriesRequest>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(save_categories(state.store(), &body.categories).await?))
}
