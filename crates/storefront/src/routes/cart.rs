//! Cart route handlers.
//!
//! Mutations answer htmx requests with fragments and an `HX-Trigger:
//! cart-updated` header; plain form posts are redirected back to `/cart`.
//! The cart id lives in the session (see [`CartStore`]).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ecom_core::{Cart, CartItem, CurrencyCode, Price, VariantId};

use super::{NavView, is_htmx};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::state::AppState;
use crate::stores::{AuthStore, CartStore};

/// Header/value pair telling htmx listeners the cart changed.
const CART_UPDATED: [(&str, &str); 1] = [("HX-Trigger", "cart-updated")];

/// Redirects a failed add's fragment away from the cart badge.
const ADD_FAILED: [(&str, &str); 2] = [
    ("HX-Retarget", "#cart-add-status"),
    ("HX-Reswap", "innerHTML"),
];

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub variant_id: String,
    pub sku: String,
    pub product_title: String,
    pub attributes: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
}

impl CartItemView {
    #[must_use]
    pub fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            variant_id: item.variant_id.to_string(),
            sku: item.sku.clone(),
            product_title: item.product_title.clone(),
            attributes: item.attributes_label(),
            quantity: item.qty,
            unit_price: Price::new(item.unit_price, currency).display(),
            line_price: Price::new(item.total_price, currency).display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Present only when the backend applied a discount.
    pub discount: Option<String>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// An empty cart.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        let zero = Price::from_minor_units(0, currency).display();
        Self {
            items: Vec::new(),
            subtotal: zero.clone(),
            discount: None,
            total: zero,
            item_count: 0,
        }
    }

    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .map(|item| CartItemView::new(item, currency))
                .collect(),
            subtotal: Price::new(cart.subtotal, currency).display(),
            discount: (!cart.discount.is_zero())
                .then(|| Price::new(cart.discount, currency).display()),
            total: Price::new(cart.total, currency).display(),
            item_count: cart.item_count,
        }
    }

    #[must_use]
    pub fn from_option(cart: Option<&Cart>, currency: CurrencyCode) -> Self {
        cart.map_or_else(|| Self::empty(currency), |c| Self::new(c, currency))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Update cart line form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub variant_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub variant_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: NavView,
    pub cart: CartView,
}

/// Cart items fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let auth = AuthStore::new(state.api(), &session);
    let api = auth.authorized_api().await?;
    let cart = CartStore::new(&api, &session).restore().await?;
    let user = auth.current_user().await?;

    let currency = state.config().currency;
    let view = CartView::from_option(cart.as_ref(), currency);

    Ok(CartShowTemplate {
        nav: NavView::new(user.as_ref(), view.item_count),
        cart: view,
    })
}

/// Add a variant to the cart, creating the cart when needed.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }
    let variant_id = VariantId::new(form.variant_id);

    let api = AuthStore::new(state.api(), &session)
        .authorized_api()
        .await?;
    let result = CartStore::new(&api, &session)
        .add_item(&variant_id, quantity)
        .await;

    if !is_htmx(&headers) {
        result?;
        return Ok(Redirect::to("/cart").into_response());
    }

    match result {
        Ok(cart) => {
            add_breadcrumb("cart", "Added item", Some(&[("variant_id", variant_id.as_str())]));
            Ok((
                AppendHeaders(CART_UPDATED),
                CartCountTemplate {
                    count: cart.item_count,
                },
            )
                .into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to add item to cart");
            // htmx only swaps 2xx bodies.
            Ok((
                AppendHeaders(ADD_FAILED),
                Html("<span class=\"cart-error\">Error adding to cart</span>"),
            )
                .into_response())
        }
    }
}

/// Update the quantity of a cart line. Zero removes the line.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let variant_id = VariantId::new(form.variant_id);
    let api = AuthStore::new(state.api(), &session)
        .authorized_api()
        .await?;
    let cart = CartStore::new(&api, &session)
        .update_item(&variant_id, form.quantity)
        .await?;

    Ok(cart_changed(&state, &headers, cart.as_ref()))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let variant_id = VariantId::new(form.variant_id);
    let api = AuthStore::new(state.api(), &session)
        .authorized_api()
        .await?;
    let cart = CartStore::new(&api, &session)
        .remove_item(&variant_id)
        .await?;

    Ok(cart_changed(&state, &headers, cart.as_ref()))
}

/// Forget the cart. The backend cart is left untouched.
#[instrument(skip(state, session, headers))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    CartStore::new(state.api(), &session).clear().await?;
    Ok(cart_changed(&state, &headers, None))
}

/// Get cart count badge (htmx).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let api = AuthStore::new(state.api(), &session)
        .api_or_anonymous()
        .await;
    let count = CartStore::new(&api, &session)
        .item_count()
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to count cart items");
            0
        });

    CartCountTemplate { count }
}

/// Response after a cart mutation: the refreshed lines for htmx, a redirect
/// for plain forms.
fn cart_changed(state: &AppState, headers: &HeaderMap, cart: Option<&Cart>) -> Response {
    if !is_htmx(headers) {
        return Redirect::to("/cart").into_response();
    }

    (
        AppendHeaders(CART_UPDATED),
        CartItemsTemplate {
            cart: CartView::from_option(cart, state.config().currency),
        },
    )
        .into_response()
}
