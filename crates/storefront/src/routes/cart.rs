//! Cart route handlers.
//!
//! The cart is kept in the session. Adding a product snapshots it from the
//! catalog; later edits in the admin do not change carts in progress.

use axum::{
    Json,
    extract::{Path, State},
};
use tower_sessions::Session;
use tracing::instrument;

use coronda_core::{Cart, ProductId};
use coronda_platform::store::ProductRepository;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{AddToCartRequest, CartView, UpdateQuantityRequest, session_keys};
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session.
///
/// A cart that no longer deserializes is discarded and replaced by an
/// empty one.
pub async fn load_cart(session: &Session) -> Result<Cart> {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => Ok(cart.unwrap_or_default()),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable session cart");
            session.remove_value(session_keys::CART).await?;
            Ok(Cart::new())
        }
    }
}

/// Save the cart to the session.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/cart
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add one unit of a product.
///
/// POST /api/cart/items
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = ProductRepository::new(state.store())
        .get(&body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Producto no encontrado.".to_string()))?;

    let mut cart = load_cart(&session).await?;
    cart.add(&product);
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added product", Some(&[("product_id", product.id.as_str())]));
    Ok(Json(CartView::from(&cart)))
}

/// Set a line's quantity; zero or less removes it.
///
/// PATCH /api/cart/items/{id}
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if !cart.update_quantity(&id, body.quantity) {
        return Err(AppError::NotFound(
            "El producto no está en el carrito.".to_string(),
        ));
    }
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// DELETE /api/cart/items/{id}
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(id): Path<ProductId>) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(&id);
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// DELETE /api/cart
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_unreadable_cart_is_discarded() {
        let session = session();
        session
            .insert(session_keys::CART, "not a cart")
            .await
            .unwrap();

        let cart = load_cart(&session).await.unwrap();
        assert!(cart.is_empty());
        assert!(
            session
                .get_value(session_keys::CART)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        let cart = load_cart(&session()).await.unwrap();
        assert_eq!(cart.count(), 0);
    }
}
