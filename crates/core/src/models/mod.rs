//! Client-side copies of backend entities.
//!
//! Every struct here mirrors the backend's JSON contract (camelCase field
//! names). The backend owns these entities; the storefront only deserializes,
//! renders, and echoes identifiers back.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod page;
pub mod timestamp;

pub use auth::{AuthRequest, AuthResponse, User};
pub use cart::{AddCartItemRequest, Cart, CartItem};
pub use catalog::{Product, ProductQuery, ProductVariant};
pub use checkout::{CheckoutSessionRequest, CheckoutSessionResponse};
pub use order::{Order, OrderItem};
pub use page::{Health, Page};
