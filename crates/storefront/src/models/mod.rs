//! Storefront request, response and session models.

pub mod api;
pub mod session;

pub use api::*;
pub use session::keys as session_keys;
