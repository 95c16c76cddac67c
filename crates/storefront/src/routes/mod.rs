//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product grid (search, category filter)
//! GET  /health                 - Liveness probe
//! GET  /health/ready           - Readiness probe (backend /health)
//!
//! # Products
//! GET  /products/{id}          - Product detail with variants
//!
//! # Cart (HTMX fragments when HX-Request is set)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (count badge + HX-Trigger)
//! POST /cart/update            - Update quantity (0 removes)
//! POST /cart/remove            - Remove line
//! POST /cart/clear             - Forget cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Shipping address and currency form
//! POST /checkout               - Create checkout session, show payment page
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (rate limited)
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action (rate limited)
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Profile and order history
//! GET  /account/orders/{id}    - Order detail
//!
//! # Admin (requires ADMIN role)
//! GET  /admin                  - Dashboard
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod home;
pub mod products;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};
use tower_sessions::Session;

use ecom_core::User;

use crate::middleware::rate_limit::RateLimiterLayer;
use crate::state::AppState;
use crate::stores::{AuthStore, CartStore};

// =============================================================================
// Shared View Data
// =============================================================================

/// Navigation bar data shown on every page.
#[derive(Debug, Clone, Default)]
pub struct NavView {
    /// Email of the logged-in user.
    pub user_email: Option<String>,
    pub is_admin: bool,
    pub cart_count: u32,
}

impl NavView {
    #[must_use]
    pub fn new(user: Option<&User>, cart_count: u32) -> Self {
        Self {
            user_email: user.map(|u| u.email.clone()),
            is_admin: user.is_some_and(User::is_admin),
            cart_count,
        }
    }

    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_email.is_some()
    }
}

/// Build the navigation bar for this visitor.
///
/// Failures degrade to an anonymous bar with an empty cart.
pub async fn load_nav(state: &AppState, session: &Session) -> NavView {
    let auth = AuthStore::new(state.api(), session);

    let user = auth.current_user().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load user for navigation");
        None
    });

    let api = auth.api_or_anonymous().await;
    let cart_count = CartStore::new(&api, session)
        .item_count()
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load cart count for navigation");
            0
        });

    NavView::new(user.as_ref(), cart_count)
}

/// Whether the request was issued by htmx.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
///
/// When `limiter` is set it guards only the credential `POST`s; the forms
/// themselves and logout stay unlimited.
pub fn auth_routes(limiter: Option<&RateLimiterLayer>) -> Router<AppState> {
    let mut login = post(auth::login);
    let mut register = post(auth::register);
    if let Some(limiter) = limiter {
        login = login.layer(limiter.clone());
        register = register.layer(limiter.clone());
    }

    Router::new()
        .route("/login", get(auth::login_page).merge(login))
        .route("/register", get(auth::register_page).merge(register))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders/{id}", get(account::order))
}

/// Create all page routes for the storefront.
///
/// `/auth` routes are returned separately by [`auth_routes`], which takes the
/// optional credential rate limiter.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products/{id}", get(products::show))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::create))
        .nest("/account", account_routes())
        .route("/admin", get(admin::dashboard))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
