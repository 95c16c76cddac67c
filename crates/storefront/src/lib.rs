//! Ecom Storefront library.
//!
//! Server-rendered shop front for the commerce backend: catalogue browsing,
//! cart, checkout hand-off, and account pages. All domain data is fetched
//! from the backend REST API; the storefront keeps only per-visitor session
//! state.
//!
//! The binary wires configuration, tracing, Sentry, and the session store
//! around [`app`]; tests build the same router against a mock backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod stores;

use axum::{Router, extract::Request};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use crate::state::AppState;

/// Directory holding CSS and other static assets.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the storefront router with its middleware stack.
///
/// Sessions are kept in `store`. Sentry layers are added by the binary so
/// tests stay free of a Sentry hub.
pub fn app<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(store, state.config());

    let limiter = state
        .config()
        .rate_limit
        .then(middleware::auth_rate_limiter);

    Router::new()
        .merge(routes::routes())
        .nest("/auth", routes::auth_routes(limiter.as_ref()))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
