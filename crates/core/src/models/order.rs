//! Orders placed through checkout.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, OrderId, OrderItemId, OrderStatus, Price, UserId, VariantId};

/// A placed order. Amounts are integer minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_cents: i64,
    pub currency: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub shipping_address: BTreeMap<String, String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Currency of the order, falling back to USD for codes the storefront
    /// does not know how to format.
    #[must_use]
    pub fn currency_code(&self) -> CurrencyCode {
        self.currency.parse().unwrap_or_default()
    }

    /// Order total as a [`Price`].
    #[must_use]
    pub fn total(&self) -> Price {
        Price::from_minor_units(self.total_cents, self.currency_code())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.qty).sum()
    }
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub variant_id: VariantId,
    pub qty: u32,
    pub unit_price_cents: i64,
}

impl OrderItem {
    /// Line total in minor units.
    #[must_use]
    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.qty)
    }
}
