//! Session-store migration.
//!
//! The storefront keeps sessions in `PostgreSQL` when a database URL is
//! configured. It never creates the table itself, so run this once per
//! database before starting the server.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;

use super::CommandError;
use ecom_storefront::config::{ConfigError, StorefrontConfig};

/// Create the `tower_sessions` schema and session table.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the migration fails.
pub async fn sessions() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let database_url = config
        .database_url
        .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session store migration complete");
    Ok(())
}
