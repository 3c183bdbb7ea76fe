//! Session-related types.
//!
//! The signed-in user and the cart live in the server-side session.

/// Session keys for storefront data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the identity provider tokens used to re-sync the session.
    pub const TOKENS: &str = "provider_tokens";

    /// Key for the visitor's cart.
    pub const CART: &str = "cart";
}
