//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request span carrying `request_id`)
//! 3. Request ID (reuse or mint `x-request-id`)
//! 4. Security headers (CSP, frame and sniffing protection)
//! 5. Session layer (tower-sessions)
//! 6. Rate limiting on the `/auth` credential posts (governor, per route)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AuthRejection, OptionalAuth, RequireAdmin, RequireAuth};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
