//! Authentication extractors.
//!
//! Resolve the visitor's [`User`] from the session through [`AuthStore`],
//! restoring it from the bearer token when only the token is cached.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use ecom_core::User;

use crate::error::set_sentry_user;
use crate::state::AppState;
use crate::stores::AuthStore;

/// Extractor that requires a logged-in user.
///
/// Anonymous visitors are redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn account(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Extractor that requires a logged-in administrator.
///
/// Anonymous visitors are redirected to the login page; customers get 403.
pub struct RequireAdmin(pub User);

/// Extractor that optionally gets the current user.
///
/// Never rejects. A session or backend failure is treated as anonymous.
pub struct OptionalAuth(pub Option<User>);

/// Rejection for the authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// No session layer or the session could not be read.
    Unauthorized,
    /// Logged in, but without the required role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Access denied").into_response(),
        }
    }
}

/// Look up the current user for this request.
async fn current_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::Unauthorized)?;

    let user = AuthStore::new(state.api(), &session)
        .current_user()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to read auth state from session");
            AuthRejection::Unauthorized
        })?;

    if let Some(user) = &user {
        set_sentry_user(&user.id, Some(&user.email));
    }

    Ok(user)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(parts, state)
            .await?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, state)
            .await?
            .ok_or(AuthRejection::RedirectToLogin)?;

        if user.is_admin() {
            Ok(Self(user))
        } else {
            tracing::info!(user_id = %user.id, "Non-admin denied admin access");
            Err(AuthRejection::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts, state).await.ok().flatten()))
    }
}
