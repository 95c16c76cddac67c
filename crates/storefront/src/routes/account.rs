//! Account route handlers.
//!
//! These routes require authentication. A token the backend rejects while
//! loading orders is forgotten and the visitor sent back to log in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use ecom_core::{Order, OrderId, OrderItem, Price, User};

use super::{NavView, load_nav};
use crate::api::ApiError;
use crate::error::{AppError, Result, clear_sentry_user};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::stores::AuthStore;

const DATE_FORMAT: &str = "%b %-d, %Y";

/// User display data for templates.
#[derive(Clone)]
pub struct UserView {
    pub email: String,
    pub role: String,
    pub member_since: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            role: if user.is_admin() { "Administrator" } else { "Customer" }.to_string(),
            member_since: user.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Order summary display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub placed_on: String,
    pub status: String,
    pub is_final: bool,
    pub total: String,
    pub unit_count: u32,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            placed_on: order.created_at.format(DATE_FORMAT).to_string(),
            status: order.status.label().to_string(),
            is_final: order.status.is_final(),
            total: order.total().display(),
            unit_count: order.unit_count(),
        }
    }
}

impl OrderView {
    /// Link to the order detail page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/account/orders/{}", urlencoding::encode(&self.id))
    }
}

/// Order line display data for templates.
#[derive(Clone)]
pub struct OrderItemView {
    pub variant_id: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl OrderItemView {
    fn new(item: &OrderItem, order: &Order) -> Self {
        let currency = order.currency_code();
        Self {
            variant_id: item.variant_id.to_string(),
            quantity: item.qty,
            unit_price: Price::from_minor_units(item.unit_price_cents, currency).display(),
            line_total: Price::from_minor_units(item.total_cents(), currency).display(),
        }
    }
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub nav: NavView,
    pub user: UserView,
    pub orders: Vec<OrderView>,
    /// Set when the order history could not be loaded.
    pub orders_error: bool,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub nav: NavView,
    pub order: OrderView,
    pub items: Vec<OrderItemView>,
    pub shipping_address: Vec<(String, String)>,
    pub payment_intent_id: Option<String>,
}

/// Display account overview page with order history.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let auth = AuthStore::new(state.api(), &session);
    let api = auth.authorized_api().await?;

    let (orders, orders_error) = match api.orders().await {
        Ok(mut orders) => {
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            (orders.iter().map(OrderView::from).collect(), false)
        }
        Err(e) if e.is_unauthorized() => return expired(&auth, &e).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch order history");
            (Vec::new(), true)
        }
    };

    Ok(AccountIndexTemplate {
        nav: load_nav(&state, &session).await,
        user: UserView::from(&user),
        orders,
        orders_error,
    }
    .into_response())
}

/// Display a single order.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let auth = AuthStore::new(state.api(), &session);
    let api = auth.authorized_api().await?;
    let id = OrderId::new(id);

    let order = match api.order(&id).await {
        Ok(order) => order,
        Err(e) if e.is_not_found() => return Err(AppError::NotFound(format!("order {id}"))),
        Err(e) if e.is_unauthorized() => return expired(&auth, &e).await,
        Err(e) => return Err(e.into()),
    };

    Ok(OrderTemplate {
        nav: load_nav(&state, &session).await,
        items: order
            .items
            .iter()
            .map(|item| OrderItemView::new(item, &order))
            .collect(),
        shipping_address: order
            .shipping_address
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        payment_intent_id: order.payment_intent_id.clone(),
        order: OrderView::from(&order),
    }
    .into_response())
}

/// Forget a token the backend no longer accepts and send the visitor to log in.
async fn expired(auth: &AuthStore<'_>, err: &ApiError) -> Result<Response> {
    tracing::info!(error = %err, "Backend rejected token, logging out");
    auth.logout().await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login").into_response())
}
