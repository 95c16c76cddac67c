//! Products, variants, and catalogue queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Price, ProductId, VariantId, format_price_range};

/// Default page size for catalogue listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A product with its purchasable variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    #[serde(default)]
    pub total_variants: u32,
}

impl Product {
    /// Price label for cards: `"$24.99"` or `"$24.99 - $34.99"`.
    #[must_use]
    pub fn price_label(&self, currency: CurrencyCode) -> String {
        format_price_range(self.min_price, self.max_price, currency)
    }

    /// First image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Variants that are switched on.
    pub fn active_variants(&self) -> impl Iterator<Item = &ProductVariant> {
        self.variants.iter().filter(|v| v.active)
    }
}

/// A SKU-level configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    pub sku: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub price: Decimal,
    #[serde(default)]
    pub inventory_qty: i32,
    #[serde(default)]
    pub active: bool,
}

impl ProductVariant {
    /// Whether the variant can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.active && self.inventory_qty > 0
    }

    /// Attributes joined for display, e.g. `"color: Red, size: M"`.
    #[must_use]
    pub fn attributes_label(&self) -> String {
        attributes_label(&self.attributes)
    }

    /// Variant price in the given currency.
    #[must_use]
    pub const fn price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.price, currency)
    }
}

/// Join an attribute map as `"key: value, key: value"` in key order.
#[must_use]
pub fn attributes_label(attributes: &BTreeMap<String, String>) -> String {
    attributes
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Query parameters for `GET /products`.
///
/// Empty strings mean "no filter" and are never sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductQuery {
    /// Build a query, dropping blank filters.
    #[must_use]
    pub fn new(search: Option<String>, category: Option<String>, page: u32, size: u32) -> Self {
        Self {
            search: non_blank(search),
            category: non_blank(category),
            page,
            size,
        }
    }

    /// Key/value pairs to append to the request URL.
    ///
    /// Page 0 and size 0 are omitted, matching the backend defaults.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if self.page > 0 {
            pairs.push(("page", self.page.to_string()));
        }
        if self.size > 0 {
            pairs.push(("size", self.size.to_string()));
        }
        pairs
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
