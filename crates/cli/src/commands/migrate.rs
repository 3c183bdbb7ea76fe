//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! coronda-cli migrate
//! ```
//!
//! Runs the embedded document-table migrations, then creates the session
//! tables for the storefront and the admin.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use coronda_platform::config::{ConfigError, get_database_url, load_dotenv};
use coronda_platform::db::{ADMIN_SESSION_TABLE, MIGRATOR, create_pool};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid session table: {0}")]
    SessionTable(String),
}

/// Run every migration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    load_dotenv();
    let database_url = get_database_url("DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running document migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Creating session tables...");
    PostgresStore::new(pool.clone()).migrate().await?;
    PostgresStore::new(pool.clone())
        .with_table_name(ADMIN_SESSION_TABLE)
        .map_err(|e| MigrationError::SessionTable(e.to_string()))?
        .migrate()
        .await?;

    tracing::info!("Migrations complete");
    Ok(())
}
