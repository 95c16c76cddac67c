//! Backend health check.

use super::{CommandError, connect};

/// Report backend health.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
pub async fn check() -> Result<(), CommandError> {
    let (config, api) = connect()?;
    let health = api.health().await?;

    if health.is_up() {
        tracing::info!(
            api_url = %config.backend.api_url,
            message = %health.message,
            "Backend is up"
        );
    } else {
        tracing::warn!(
            api_url = %config.backend.api_url,
            status = %health.status,
            message = %health.message,
            "Backend reports degraded health"
        );
    }
    Ok(())
}
