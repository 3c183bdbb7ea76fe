//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog
//! GET    /api/products              - Product listing (?category=&search=)
//! GET    /api/products/{id}         - Product detail
//! GET    /api/categories            - Categories
//! GET    /api/slider                - Featured products and advertisements
//! GET    /api/about                 - "About us" content
//! GET    /api/shipping              - Shipping cost
//!
//! # Cart (session)
//! GET    /api/cart                  - Current cart
//! DELETE /api/cart                  - Empty the cart
//! POST   /api/cart/items            - Add one unit of a product
//! PATCH  /api/cart/items/{id}       - Set quantity
//! DELETE /api/cart/items/{id}       - Remove a line
//!
//! # Checkout
//! POST   /api/checkout              - Record sale and open payment preference
//! POST   /api/create-payment        - Payment preference for a supplied cart
//! POST   /api/webhook               - Payment provider notifications
//!
//! # Auth (rate limited in the binary)
//! POST   /api/auth/register         - Create account
//! POST   /api/auth/login            - Sign in
//! POST   /api/auth/logout           - Sign out
//! GET    /api/auth/session          - Current user
//!
//! # Account (requires auth)
//! GET    /api/account               - Profile
//! GET    /api/account/sales         - Order history
//!
//! POST   /api/contact               - Contact form
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod products;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
        .route("/slider", get(products::slider))
        .route("/about", get(products::about))
        .route("/shipping", get(products::shipping))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/sales", get(account::sales))
}

/// Create all `/api` routes except auth.
///
/// Auth routes are nested separately so the binary can put them behind
/// the rate limiter.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .route("/create-payment", post(checkout::create_payment))
        .route("/webhook", post(checkout::webhook))
        .nest("/account", account_routes())
        .route("/contact", post(contact::submit))
}
