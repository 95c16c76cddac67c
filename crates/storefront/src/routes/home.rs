//! Home page: the searchable product grid.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ecom_core::models::catalog::DEFAULT_PAGE_SIZE;
use ecom_core::{CurrencyCode, Page, Product, ProductQuery};

use super::{NavView, load_nav};
use crate::filters;
use crate::state::AppState;

/// Categories offered in the filter, as `(value, label)`. An empty value
/// means no filter.
pub const CATEGORIES: [(&str, &str); 5] = [
    ("", "All Categories"),
    ("Electronics", "Electronics"),
    ("Clothing", "Clothing"),
    ("Accessories", "Accessories"),
    ("Home & Kitchen", "Home & Kitchen"),
];

/// Product card data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub price: String,
    pub total_variants: u32,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            image: product.primary_image().map(String::from),
            price: product.price_label(currency),
            total_variants: product.total_variants,
        }
    }

    /// Link to the product detail page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/products/{}", urlencoding::encode(&self.id))
    }
}

/// Category filter option.
#[derive(Clone)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavView,
    pub products: Vec<ProductCardView>,
    pub search: String,
    pub categories: Vec<CategoryOption>,
    pub page: u32,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

/// Display the home page.
///
/// A failing backend renders the empty grid rather than an error page.
#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let product_query = ProductQuery::new(
        query.search,
        query.category,
        query.page.unwrap_or(0),
        DEFAULT_PAGE_SIZE,
    );

    let page = state
        .api()
        .products(&product_query)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch products");
            Page::empty(product_query.size)
        });

    let currency = state.config().currency;
    let products = page
        .content
        .iter()
        .map(|p| ProductCardView::new(p, currency))
        .collect();

    let selected = product_query.category.as_deref().unwrap_or("");
    let categories = CATEGORIES
        .iter()
        .map(|&(value, label)| CategoryOption {
            value,
            label,
            selected: value == selected,
        })
        .collect();

    HomeTemplate {
        nav: load_nav(&state, &session).await,
        products,
        search: product_query.search.clone().unwrap_or_default(),
        categories,
        page: product_query.page,
        prev_url: page
            .has_previous()
            .then(|| page_url(&product_query, product_query.page.saturating_sub(1))),
        next_url: page
            .has_next()
            .then(|| page_url(&product_query, product_query.page + 1)),
    }
}

/// Home page link for `page` keeping the current filters.
fn page_url(query: &ProductQuery, page: u32) -> String {
    let mut params = Vec::with_capacity(3);
    if let Some(search) = &query.search {
        params.push(format!("search={}", urlencoding::encode(search)));
    }
    if let Some(category) = &query.category {
        params.push(format!("category={}", urlencoding::encode(category)));
    }
    params.push(format!("page={page}"));
    format!("/?{}", params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_keeps_filters() {
        let query = ProductQuery::new(
            Some("coffee mug".to_string()),
            Some("Home & Kitchen".to_string()),
            1,
            DEFAULT_PAGE_SIZE,
        );
        assert_eq!(
            page_url(&query, 2),
            "/?search=coffee%20mug&category=Home%20%26%20Kitchen&page=2"
        );
    }

    #[test]
    fn test_page_url_without_filters() {
        assert_eq!(page_url(&ProductQuery::default(), 1), "/?page=1");
    }

    #[test]
    fn test_categories_start_with_all() {
        assert_eq!(CATEGORIES[0], ("", "All Categories"));
        assert_eq!(CATEGORIES.len(), 5);
    }
}
