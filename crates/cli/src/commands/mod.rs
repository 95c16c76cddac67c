//! CLI subcommands.

pub mod cart;
pub mod catalog;
pub mod health;
pub mod migrate;
pub mod orders;

use ecom_storefront::api::{ApiClient, ApiError};
use ecom_storefront::config::{ConfigError, StorefrontConfig, get_required_env};
use secrecy::SecretString;
use thiserror::Error;

/// Environment variable holding a bearer token for user-scoped commands.
pub const API_TOKEN_VAR: &str = "ECOM_API_TOKEN";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Load configuration and build an anonymous backend client.
fn connect() -> Result<(StorefrontConfig, ApiClient), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let api = ApiClient::new(&config.backend)?;
    tracing::debug!(api_url = %config.backend.api_url, "Using backend");
    Ok((config, api))
}

/// Build a client acting as the user whose token is in `ECOM_API_TOKEN`.
fn connect_as_user() -> Result<(StorefrontConfig, ApiClient), CommandError> {
    let (config, api) = connect()?;
    let token = SecretString::from(get_required_env(API_TOKEN_VAR)?);
    Ok((config, api.with_token(token)))
}
