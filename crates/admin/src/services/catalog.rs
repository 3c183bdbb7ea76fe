//! Product form validation and category management.

use std::collections::HashSet;

use tracing::instrument;

use coronda_core::{Category, CategoryId, ProductFields};
use coronda_platform::StoreError;
use coronda_platform::store::{CategoryRepository, DocumentStore};

use crate::error::{AppError, Result};
use crate::models::CategoryInput;

/// Check a submitted product before it is saved.
///
/// Name, price and category are required; a zero price counts as missing.
///
/// # Errors
///
/// Returns `AppError::BadRequest` describing the first problem found.
pub fn validate_product(fields: &ProductFields) -> Result<()> {
    if fields.name.trim().is_empty() || fields.price.is_zero() || fields.category.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Por favor, completa Nombre, Precio y Categoría.".to_string(),
        ));
    }
    if fields.price.is_negative() || fields.stock < 0 {
        return Err(AppError::BadRequest(
            "El precio y el stock no pueden ser negativos.".to_string(),
        ));
    }
    Ok(())
}

/// Trimmed category name, rejecting blanks.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when the name is empty.
pub fn category_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest(
            "El nombre de la categoría es requerido.".to_string(),
        ));
    }
    Ok(name)
}

/// Replace the category list with the one edited in the category dialog.
///
/// Categories missing from `inputs` are removed. Every removed category is
/// checked for use before anything is written, so a 409 leaves the list
/// untouched. Then each row is written one at a time (rows with an id are
/// upserted, new rows created), the removed categories are deleted, and
/// the fresh list is returned.
///
/// # Errors
///
/// Returns `StoreError::Conflict` when a removed category is still in use,
/// `AppError::BadRequest` for a blank name, and store errors otherwise.
#[instrument(skip(store, inputs), fields(count = inputs.len()))]
pub async fn save_categories(
    store: &dyn DocumentStore,
    inputs: &[CategoryInput],
) -> Result<Vec<Category>> {
    let repo = CategoryRepository::new(store);

    let names = inputs
        .iter()
        .map(|input| category_name(&input.name))
        .collect::<Result<Vec<_>>>()?;

    let kept: HashSet<&CategoryId> = inputs.iter().filter_map(|i| i.id.as_ref()).collect();
    let removed: Vec<Category> = repo
        .list()
        .await?
        .into_iter()
        .filter(|c| !kept.contains(&c.id))
        .collect();

    for category in &removed {
        if repo.is_in_use(&category.name).await? {
            return Err(StoreError::Conflict(format!(
                "No se puede eliminar la categoría \"{}\" porque está siendo utilizada por uno o \
                 más productos.",
                category.name
            ))
            .into());
        }
    }

    for (input, name) in inputs.iter().zip(names) {
        match &input.id {
            Some(id) => {
                repo.upsert(&Category {
                    id: id.clone(),
                    name: name.to_string(),
                })
                .await?;
            }
            None => {
                repo.create(name).await?;
            }
        }
    }

    for category in &removed {
        repo.delete(&category.id).await?;
    }

    tracing::info!(removed = removed.len(), "Categories saved");
    Ok(repo.list().await?)
}
