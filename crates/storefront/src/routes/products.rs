//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use ecom_core::{CurrencyCode, Product, ProductId, ProductVariant};

use super::{NavView, load_nav};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub images: Vec<String>,
    pub variants: Vec<VariantView>,
}

/// Variant display data for templates.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub sku: String,
    pub attributes: String,
    pub price: String,
    pub inventory_qty: i32,
    pub active: bool,
    /// Active with stock on hand; only these get an add-to-cart form.
    pub purchasable: bool,
}

impl VariantView {
    #[must_use]
    pub fn new(variant: &ProductVariant, currency: CurrencyCode) -> Self {
        Self {
            id: variant.id.to_string(),
            sku: variant.sku.clone(),
            attributes: variant.attributes_label(),
            price: variant.price(currency).display(),
            inventory_qty: variant.inventory_qty.max(0),
            active: variant.active,
            purchasable: variant.in_stock(),
        }
    }

    /// Stock column text.
    #[must_use]
    pub fn stock_label(&self) -> String {
        if !self.active {
            "Unavailable".to_string()
        } else if self.inventory_qty > 0 {
            format!("{} in stock", self.inventory_qty)
        } else {
            "Out of stock".to_string()
        }
    }
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, variants: &[ProductVariant], currency: CurrencyCode) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price_label(currency),
            images: product.images.clone(),
            variants: variants
                .iter()
                .map(|v| VariantView::new(v, currency))
                .collect(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: NavView,
    pub product: ProductView,
}

/// Display a product with its variants.
///
/// Variants embedded in the product are used when present; otherwise they are
/// fetched from the variants endpoint.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);

    let product = state.api().product(&id).await.map_err(|e| {
        if e.is_not_found() {
            AppError::NotFound(format!("product {id}"))
        } else {
            AppError::Api(e)
        }
    })?;

    let variants = if product.variants.is_empty() {
        state
            .api()
            .product_variants(&id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(product_id = %id, error = %e, "Failed to fetch variants");
                Vec::new()
            })
    } else {
        product.variants.clone()
    };

    Ok(ProductShowTemplate {
        nav: load_nav(&state, &session).await,
        product: ProductView::new(&product, &variants, state.config().currency),
    })
}
