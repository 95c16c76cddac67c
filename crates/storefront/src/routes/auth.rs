//! Authentication route handlers.
//!
//! Credentials are checked by the backend; on success the issued bearer
//! token is kept in the session. Failures redirect back to the form with an
//! `?error=` code.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ecom_core::{AuthRequest, Email};

use super::{NavView, load_nav};
use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;
use crate::stores::{AuthStore, StoreError};

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Visitor-facing text for an `?error=` code.
#[must_use]
pub fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password.",
        "email_taken" => "An account with this email already exists.",
        "invalid_email" => "Please enter a valid email address.",
        "password_required" => "Please enter a password.",
        "password_mismatch" => "Passwords do not match.",
        "rejected" => "Registration was rejected. Please check your details.",
        "session" => "Your session could not be saved. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Visitor-facing text for a `?success=` code.
#[must_use]
pub fn success_message(code: &str) -> Option<&'static str> {
    match code {
        "logged_out" => Some("You have been logged out."),
        _ => None,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavView,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: NavView,
    pub error: Option<&'static str>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Logged-in visitors go to their account.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }

    LoginTemplate {
        nav: load_nav(&state, &session).await,
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().and_then(success_message),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let request = AuthRequest {
        email: form.email.trim().to_string(),
        password: form.password,
    };

    match AuthStore::new(state.api(), &session).login(&request).await {
        Ok(user) => {
            set_sentry_user(&user.id, Some(&user.email));
            Redirect::to("/account").into_response()
        }
        Err(StoreError::Session(e)) => {
            tracing::error!(error = %e, "Failed to save login to session");
            Redirect::to("/auth/login?error=session").into_response()
        }
        Err(StoreError::Api(e)) => {
            tracing::warn!(error = %e, "Login failed");
            let code = if e.status().is_some_and(|s| s.is_client_error()) {
                "credentials"
            } else {
                "unavailable"
            };
            Redirect::to(&format!("/auth/login?error={code}")).into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page. Logged-in visitors go to their account.
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }

    RegisterTemplate {
        nav: load_nav(&state, &session).await,
        error: query.error.as_deref().map(error_message),
    }
    .into_response()
}

/// Handle registration form submission.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected registration email");
            return Redirect::to("/auth/register?error=invalid_email").into_response();
        }
    };
    if form.password.is_empty() {
        return Redirect::to("/auth/register?error=password_required").into_response();
    }
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=password_mismatch").into_response();
    }

    let request = AuthRequest {
        email: email.into_inner(),
        password: form.password,
    };

    match AuthStore::new(state.api(), &session).register(&request).await {
        Ok(user) => {
            set_sentry_user(&user.id, Some(&user.email));
            Redirect::to("/account").into_response()
        }
        Err(StoreError::Session(e)) => {
            tracing::error!(error = %e, "Failed to save registration to session");
            Redirect::to("/auth/register?error=session").into_response()
        }
        Err(StoreError::Api(e)) => {
            tracing::warn!(error = %e, "Registration failed");
            let code = registration_error_code(&e);
            Redirect::to(&format!("/auth/register?error={code}")).into_response()
        }
    }
}

/// Classify a backend registration failure.
fn registration_error_code(err: &ApiError) -> &'static str {
    let Some(status) = err.status() else {
        return "unavailable";
    };
    let message = err.to_string().to_lowercase();
    if status.as_u16() == 409 || message.contains("taken") || message.contains("already") {
        "email_taken"
    } else if status.is_client_error() {
        "rejected"
    } else {
        "unavailable"
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout. Only local state is cleared; the cart is kept.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Err(e) = AuthStore::new(state.api(), &session).logout().await {
        tracing::error!(error = %e, "Failed to clear auth state from session");
    }
    clear_sentry_user();
    Redirect::to("/auth/login?success=logged_out").into_response()
}
