//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers that cannot degrade to an empty
//! view return `Result<T, AppError>`.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::filters;
use crate::routes::NavView;
use crate::stores::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Session read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Api(e) => Self::Api(e),
            StoreError::Session(e) => Self::Session(e),
        }
    }
}

impl AppError {
    /// HTTP status presented to the visitor.
    ///
    /// Backend 404 and 401/403 pass through; any other backend failure is a
    /// bad gateway.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Api(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Api(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Api(ApiError::InvalidUrl(_)) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the visitor.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::NOT_FOUND => "The page you were looking for could not be found.".to_string(),
            StatusCode::UNAUTHORIZED => "Please log in to continue.".to_string(),
            StatusCode::BAD_GATEWAY => {
                "The store is temporarily unavailable. Please try again shortly.".to_string()
            }
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    nav: NavView,
    status: u16,
    title: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status_code();
        let message = self.public_message();

        let page = ErrorTemplate {
            nav: NavView::default(),
            status: status.as_u16(),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: message.clone(),
        };

        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, message).into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called once the visitor's user is known so errors are associated with them.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for visitor actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("variant_id", "v-1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(status: StatusCode) -> AppError {
        AppError::Api(ApiError::Status {
            status,
            message: "backend said no".to_string(),
        })
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(backend(StatusCode::FORBIDDEN)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::InvalidUrl("x".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_statuses_pass_through() {
        assert_eq!(
            backend(StatusCode::NOT_FOUND).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            backend(StatusCode::UNAUTHORIZED).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            backend(StatusCode::SERVICE_UNAVAILABLE).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_backend_detail_is_hidden() {
        let err = backend(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("backend said no"));
    }

    #[test]
    fn test_store_error_unwraps_backend_error() {
        let err: AppError = StoreError::Api(ApiError::InvalidUrl("x".to_string())).into();
        assert!(matches!(err, AppError::Api(ApiError::InvalidUrl(_))));
    }
}
