//! `PostgreSQL` connection pool and schema migrations.
//!
//! # Tables
//!
//! - `documents` - every collection record, keyed by `(collection, id)`,
//!   with the body in a JSONB column
//! - `tower_sessions.session` - storefront sessions, created by the session
//!   store's own migration
//! - `tower_sessions.admin_session` - back-office sessions, same shape
//!
//! # Migrations
//!
//! Migrations are stored in `crates/platform/migrations/` and run via:
//! ```bash
//! cargo run -p coronda-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

/// Session table used by the admin binary.
pub const ADMIN_SESSION_TABLE: &str = "admin_session";

/// Embedded migrations for the document table.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
