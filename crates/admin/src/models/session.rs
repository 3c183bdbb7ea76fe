//! Session keys for admin authentication.
//!
//! The signed-in admin is stored as a `SessionUser` with `is_admin` set.

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the identity provider tokens used to re-sync the session.
    pub const TOKENS: &str = "admin_provider_tokens";
}
