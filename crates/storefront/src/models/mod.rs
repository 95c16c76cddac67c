//! Storefront-local models.
//!
//! Domain data (products, carts, orders) lives in `ecom_core` and is owned by
//! the backend. What remains here is visitor state kept in the session.

pub mod session;

pub use session::keys as session_keys;
