//! Cart inspection.

use ecom_core::{CartId, Price};

use super::{CommandError, connect};

/// Show a cart's lines and totals.
///
/// # Errors
///
/// Returns an error if the cart does not exist or the backend call fails.
pub async fn show(id: &str) -> Result<(), CommandError> {
    let (config, api) = connect()?;
    let cart = api.cart(&CartId::new(id)).await?;
    let currency = config.currency;

    for item in &cart.items {
        tracing::info!(
            variant_id = %item.variant_id,
            sku = %item.sku,
            qty = item.qty,
            unit_price = %Price::new(item.unit_price, currency),
            total = %Price::new(item.total_price, currency),
            "{}",
            item.product_title
        );
    }

    tracing::info!(
        id = %cart.id,
        items = cart.item_count,
        subtotal = %Price::new(cart.subtotal, currency),
        discount = %Price::new(cart.discount, currency),
        total = %Price::new(cart.total, currency),
        "Cart"
    );
    if !cart.totals_are_consistent() {
        tracing::warn!("Cart totals do not add up");
    }
    Ok(())
}
