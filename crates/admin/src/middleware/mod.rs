//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID
//! 4. Security headers (adds HSTS)
//! 5. Session layer (SameSite=Strict, 24h)
//! 6. [`RequireAdmin`] extractor on every route but login

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAdmin, RequireAdmin, clear_current_admin, current_admin_tokens, refresh_current_admin,
    set_current_admin,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
