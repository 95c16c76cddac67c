//! Carts and cart line items.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartId, CartItemId, UserId, VariantId};

/// A server-priced cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub item_count: u32,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `total == subtotal - discount` and every line satisfies
    /// [`CartItem::total_is_consistent`].
    ///
    /// The backend guarantees this; the storefront only checks it so that a
    /// mispriced cart shows up in the logs.
    #[must_use]
    pub fn totals_are_consistent(&self) -> bool {
        self.total == self.subtotal - self.discount
            && self.items.iter().all(CartItem::total_is_consistent)
    }
}

/// A cart line with denormalized product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub variant_id: VariantId,
    pub sku: String,
    pub product_title: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub qty: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl CartItem {
    /// `total_price == qty * unit_price`.
    #[must_use]
    pub fn total_is_consistent(&self) -> bool {
        self.total_price == self.unit_price * Decimal::from(self.qty)
    }

    /// Attributes joined for display.
    #[must_use]
    pub fn attributes_label(&self) -> String {
        super::catalog::attributes_label(&self.attributes)
    }
}

/// Body of `POST /carts/{id}/items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub variant_id: VariantId,
    pub qty: u32,
}
