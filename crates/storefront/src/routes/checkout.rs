//! Checkout route handlers.
//!
//! The storefront collects a shipping address and currency, asks the backend
//! for a checkout session, and hands the payment intent's client secret to
//! the payment widget. Capturing the payment happens outside the storefront.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ecom_core::{CheckoutSessionRequest, CurrencyCode};

use super::NavView;
use super::cart::CartView;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;
use crate::stores::{AuthStore, CartStore};

// =============================================================================
// Form Types
// =============================================================================

/// Checkout form data.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CheckoutForm {
    pub currency: String,
    pub name: String,
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    pub city: String,
    #[serde(default)]
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

impl CheckoutForm {
    /// Validate the form into a currency and a backend shipping address.
    ///
    /// # Errors
    ///
    /// Returns a visitor-facing message naming the first problem found.
    pub fn validate(&self) -> std::result::Result<(CurrencyCode, BTreeMap<String, String>), String> {
        let currency: CurrencyCode = self
            .currency
            .parse()
            .map_err(|_| "Please choose a supported currency.".to_string())?;

        let required = [
            ("name", "Full name", &self.name),
            ("line1", "Address", &self.line1),
            ("city", "City", &self.city),
            ("postalCode", "Postal code", &self.postal_code),
            ("country", "Country", &self.country),
        ];
        let optional = [("line2", &self.line2), ("region", &self.region)];

        let mut address = BTreeMap::new();
        for (key, label, value) in required {
            let value = value.trim();
            if value.is_empty() {
                return Err(format!("{label} is required."));
            }
            address.insert(key.to_string(), value.to_string());
        }
        for (key, value) in optional {
            let value = value.trim();
            if !value.is_empty() {
                address.insert(key.to_string(), value.to_string());
            }
        }

        Ok((currency, address))
    }
}

/// Currency select option.
#[derive(Clone)]
pub struct CurrencyOption {
    pub code: &'static str,
    pub selected: bool,
}

fn currency_options(selected: &str) -> Vec<CurrencyOption> {
    CurrencyCode::ALL
        .into_iter()
        .map(|c| CurrencyOption {
            code: c.code(),
            selected: c.code().eq_ignore_ascii_case(selected),
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/new.html")]
pub struct CheckoutTemplate {
    pub nav: NavView,
    pub cart: CartView,
    pub form: CheckoutForm,
    pub currencies: Vec<CurrencyOption>,
    pub error: Option<String>,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub nav: NavView,
    pub payment_intent_id: String,
    pub client_secret: String,
    pub amount: String,
    pub currency: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout form. An empty or missing cart goes back to `/cart`.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let auth = AuthStore::new(state.api(), &session);
    let api = auth.authorized_api().await?;
    let Some(cart) = CartStore::new(&api, &session).restore().await? else {
        return Ok(Redirect::to("/cart").into_response());
    };
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let user = auth.current_user().await?;
    let currency = state.config().currency;

    Ok(CheckoutTemplate {
        nav: NavView::new(user.as_ref(), cart.item_count),
        cart: CartView::new(&cart, currency),
        form: CheckoutForm::default(),
        currencies: currency_options(currency.code()),
        error: None,
    }
    .into_response())
}

/// Create a checkout session for the active cart and render the payment page.
///
/// The cart is kept; it becomes an order once the payment is captured.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let auth = AuthStore::new(state.api(), &session);
    let api = auth.authorized_api().await?;
    let Some(cart) = CartStore::new(&api, &session).restore().await? else {
        return Ok(Redirect::to("/cart").into_response());
    };
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let user = auth.current_user().await?;
    let nav = NavView::new(user.as_ref(), cart.item_count);

    let rerender = |error: String| CheckoutTemplate {
        nav: nav.clone(),
        cart: CartView::new(&cart, state.config().currency),
        currencies: currency_options(&form.currency),
        form: form.clone(),
        error: Some(error),
    };

    let (currency, shipping_address) = match form.validate() {
        Ok(valid) => valid,
        Err(message) => return Ok(rerender(message).into_response()),
    };

    let request = CheckoutSessionRequest {
        cart_id: cart.id.clone(),
        currency: currency.code().to_string(),
        shipping_address,
    };

    let checkout = match api.create_checkout_session(&request).await {
        Ok(checkout) => checkout,
        Err(e) if e.status().is_some_and(|s| s.is_client_error()) => {
            tracing::warn!(error = %e, "Backend refused checkout session");
            return Ok(rerender(e.to_string()).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    add_breadcrumb(
        "checkout",
        "Created checkout session",
        Some(&[("payment_intent_id", checkout.payment_intent_id.as_str())]),
    );

    Ok(PaymentTemplate {
        nav,
        amount: checkout.amount_due().display(),
        currency: checkout.currency.to_uppercase(),
        payment_intent_id: checkout.payment_intent_id,
        client_secret: checkout.client_secret,
    }
    .into_response())
}
