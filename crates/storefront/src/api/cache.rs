//! Cache types for anonymous catalogue reads.

use std::sync::Arc;

use ecom_core::{Page, Product, ProductId, ProductQuery, ProductVariant};

/// Cache key for catalogue responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products(ProductQuery),
    Product(ProductId),
    Variants(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Page<Product>>),
    Product(Arc<Product>),
    Variants(Arc<Vec<ProductVariant>>),
}
