//! Order history commands.
//!
//! These act as the user whose bearer token is in `ECOM_API_TOKEN`.

use ecom_core::{OrderId, Price};

use super::{CommandError, connect_as_user};

/// List the user's orders, newest first.
///
/// # Errors
///
/// Returns an error if the token is missing or rejected.
pub async fn list() -> Result<(), CommandError> {
    let (_, api) = connect_as_user()?;
    let mut orders = api.orders().await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if orders.is_empty() {
        tracing::info!("No orders");
    }
    for order in &orders {
        tracing::info!(
            id = %order.id,
            placed = %order.created_at.format("%Y-%m-%d %H:%M"),
            status = %order.status,
            units = order.unit_count(),
            total = %order.total(),
            "order"
        );
    }
    Ok(())
}

/// Show one order with its lines.
///
/// # Errors
///
/// Returns an error if the token is missing or rejected, or the order does
/// not exist.
pub async fn show(id: &str) -> Result<(), CommandError> {
    let (_, api) = connect_as_user()?;
    let order = api.order(&OrderId::new(id)).await?;
    let currency = order.currency_code();

    tracing::info!(
        id = %order.id,
        status = %order.status,
        total = %order.total(),
        payment_intent = order.payment_intent_id.as_deref().unwrap_or("-"),
        "order"
    );
    for item in &order.items {
        tracing::info!(
            variant_id = %item.variant_id,
            qty = item.qty,
            unit_price = %Price::from_minor_units(item.unit_price_cents, currency),
            total = %Price::from_minor_units(item.total_cents(), currency),
            "line"
        );
    }
    for (key, value) in &order.shipping_address {
        tracing::info!(field = %key, value = %value, "shipping");
    }
    Ok(())
}
