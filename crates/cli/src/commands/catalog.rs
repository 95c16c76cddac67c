//! Catalogue inspection commands.

use ecom_core::{ProductId, ProductQuery};

use super::{CommandError, connect};

/// List one page of products.
///
/// # Errors
///
/// Returns an error if the backend call fails.
pub async fn list(
    search: Option<String>,
    category: Option<String>,
    page: u32,
    size: u32,
) -> Result<(), CommandError> {
    let (config, api) = connect()?;
    let query = ProductQuery::new(search, category, page, size);
    let results = api.products(&query).await?;

    tracing::info!(
        page = results.number + 1,
        total_pages = results.total_pages,
        total = results.total_elements,
        "Products"
    );
    for product in &results.content {
        tracing::info!(
            id = %product.id,
            category = %product.category,
            price = %product.price_label(config.currency),
            variants = product.total_variants,
            "{}",
            product.title
        );
    }
    Ok(())
}

/// Show a product and its variants.
///
/// # Errors
///
/// Returns an error if the product does not exist or the backend call fails.
pub async fn show(id: &str) -> Result<(), CommandError> {
    let (config, api) = connect()?;
    let id = ProductId::new(id);
    let product = api.product(&id).await?;
    let variants = if product.variants.is_empty() {
        api.product_variants(&id).await?
    } else {
        product.variants.clone()
    };

    tracing::info!(
        id = %product.id,
        category = %product.category,
        price = %product.price_label(config.currency),
        "{}",
        product.title
    );
    for variant in &variants {
        tracing::info!(
            id = %variant.id,
            sku = %variant.sku,
            attributes = %variant.attributes_label(),
            price = %variant.price(config.currency),
            inventory = variant.inventory_qty,
            active = variant.active,
            "variant"
        );
    }
    Ok(())
}
