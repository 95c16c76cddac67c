//! Session-related types.
//!
//! The session plays the role of the visitor's browser storage: it survives
//! page loads for the lifetime of the session cookie and holds exactly three
//! values.

/// Session keys for visitor state.
pub mod keys {
    /// Bearer token issued by the backend at login or registration (`String`).
    pub const TOKEN: &str = "token";

    /// Identifier of the visitor's active cart (`CartId`).
    pub const CART_ID: &str = "cart_id";

    /// Cached profile of the logged-in user (`User`).
    pub const CURRENT_USER: &str = "current_user";
}
