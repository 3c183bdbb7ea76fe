//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/login              - Sign in (admins only)
//! POST   /api/auth/logout             - Sign out
//! GET    /api/auth/session            - Current admin
//!
//! # Everything below requires an admin session
//! GET    /api/dashboard               - Revenue and shop totals
//!
//! GET    /api/products                - Product listing
//! POST   /api/products                - Create product
//! PUT    /api/products/{id}           - Update product
//! DELETE /api/products/{id}           - Delete product
//!
//! GET    /api/categories              - Category listing
//! POST   /api/categories              - Create category
//! PUT    /api/categories              - Save the whole list
//! PUT    /api/categories/{id}         - Rename category
//! DELETE /api/categories/{id}         - Delete category (409 when in use)
//!
//! GET    /api/sales                   - Sales, newest first
//! GET    /api/sales/{id}              - Sale detail
//! PATCH  /api/sales/{id}              - Change status
//! DELETE /api/sales/{id}              - Delete sale
//! GET    /api/sales/{id}/suggestions  - Products to offer the buyer
//!
//! GET    /api/users                   - Customers
//!
//! GET    /api/settings                - About, shipping, featured, ads
//! PUT    /api/settings                - Save all of the above
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod products;
pub mod sales;
pub mod settings;
pub mod users;


use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/{id}", put(products::update).delete(products::destroy))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::index)
                .post(categories::create)
                .put(categories::save_all),
        )
        .route(
            "/{id}",
            put(categories::rename).delete(categories::destroy),
        )
}

/// Create the sales routes router.
pub fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sales::index))
        .route(
            "/{id}",
            get(sales::show)
                .patch(sales::update_status)
                .delete(sales::destroy),
        )
        .route("/{id}/suggestions", get(sales::suggestions))
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/dashboard", get(dashboard::index))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/sales", sales_routes())
        .route("/users", get(users::index))
        .route("/settings", get(settings::show).put(settings::update))
}
