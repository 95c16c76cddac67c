//! Health probes.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Probes the backend's `/health`; 503 when it is unreachable or not `UP`.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().health().await {
        Ok(report) if report.is_up() => StatusCode::OK,
        Ok(report) => {
            tracing::warn!(status = %report.status, "Backend reports unhealthy");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(e) => {
            tracing::warn!(error = %e, "Backend health probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
