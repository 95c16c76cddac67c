//! Checkout session payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CartId, CurrencyCode, Price};

/// Body of `POST /checkout/session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionRequest {
    pub cart_id: CartId,
    pub currency: String,
    pub shipping_address: BTreeMap<String, String>,
}

/// Server-issued handle binding a cart snapshot to a payment intent.
///
/// `amount` is in minor units. Implements `Debug` manually to redact the
/// client secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub cart_id: CartId,
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

impl CheckoutSessionResponse {
    /// Amount due as a [`Price`].
    #[must_use]
    pub fn amount_due(&self) -> Price {
        let currency: CurrencyCode = self.currency.parse().unwrap_or_default();
        Price::from_minor_units(self.amount, currency)
    }
}

impl std::fmt::Debug for CheckoutSessionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSessionResponse")
            .field("cart_id", &self.cart_id)
            .field("payment_intent_id", &self.payment_intent_id)
            .field("client_secret", &"[REDACTED]")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .finish()
    }
}
