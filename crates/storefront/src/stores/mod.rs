//! Per-visitor state backed by the session.
//!
//! Stores borrow the shared [`ApiClient`](crate::api::ApiClient) and the
//! request's [`Session`](tower_sessions::Session); they are built per request
//! and hold nothing beyond it.
//!
//! - [`AuthStore`]: bearer token and cached user profile
//! - [`CartStore`]: active cart id and cart mutations

mod auth;
mod cart;

pub use auth::AuthStore;
pub use cart::CartStore;

use thiserror::Error;

use crate::api::ApiError;

/// Errors raised by the session-backed stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}
