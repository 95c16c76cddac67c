//! Admin dashboard.
//!
//! Store management (catalogue, inventory, orders) is handled by the backend's
//! own tooling; the storefront only reserves the entry point.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use super::{NavView, load_nav};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub nav: NavView,
    pub email: String,
}

/// Display the admin dashboard placeholder.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> impl IntoResponse {
    DashboardTemplate {
        nav: load_nav(&state, &session).await,
        email: user.email,
    }
}
