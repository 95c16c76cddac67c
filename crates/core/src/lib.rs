//! Ecom Core - Shared types library.
//!
//! This crate provides the types used across all storefront components:
//! - `storefront` - server-rendered shop over the commerce backend
//! - `cli` - operator tooling against the same backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! handling. It mirrors the backend's REST contract so every component
//! decodes the same JSON the same way.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`models`] - Client-side copies of backend entities and request bodies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
