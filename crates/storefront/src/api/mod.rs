//! REST client for the commerce backend.
//!
//! # Architecture
//!
//! - Thin wrapper over `reqwest`: one method per backend endpoint, JSON in and out
//! - The backend is the source of truth - NO local persistence of domain data
//! - Bearer token injection per visitor via [`ApiClient::with_token`]
//! - In-memory caching via `moka` for anonymous catalogue reads
//!
//! # Response handling
//!
//! - Non-2xx: [`ApiError::Status`] carrying the response body text, or
//!   `HTTP error! status: <code>` when the body is empty
//! - Void endpoints: any 2xx (including 204) succeeds without decoding a body
//! - Everything else: the body is decoded as JSON
//!
//! # Example
//!
//! ```rust,ignore
//! use ecom_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.backend)?;
//!
//! // Browse anonymously
//! let page = client.products(&ProductQuery::default()).await?;
//!
//! // Act on behalf of a logged-in visitor
//! let orders = client.with_token(token).orders().await?;
//! ```

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use ecom_core::{
    AddCartItemRequest, AuthRequest, AuthResponse, Cart, CartId, CheckoutSessionRequest,
    CheckoutSessionResponse, Health, Order, OrderId, Page, Product, ProductId, ProductQuery,
    ProductVariant, User, VariantId,
};

use crate::config::BackendConfig;
use cache::{CacheKey, CacheValue};

/// User agent sent with every backend request.
const USER_AGENT: &str = concat!("ecom-storefront/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Response body text, or a generic message when the body was empty.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot carry endpoint paths.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Status code of a [`ApiError::Status`] error.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }

    /// Whether the backend reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Build the error for a non-success response.
    fn from_status(status: StatusCode, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP error! status: {}", status.as_u16())
        } else {
            body.to_string()
        };
        Self::Status { status, message }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the commerce backend REST API.
///
/// Cheaply cloneable. A clone made with [`ApiClient::with_token`] shares the
/// connection pool and cache but authenticates as one visitor.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    token: Option<SecretString>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot have a path appended or the
    /// underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        if config.api_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.api_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let cache = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                cache,
            }),
            token: None,
        })
    }

    /// A client that authenticates every request with `token`.
    #[must_use]
    pub fn with_token(&self, token: SecretString) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: Some(token),
        }
    }

    /// Whether requests carry a bearer token.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Build an endpoint URL from path segments (each segment is escaped).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request with the JSON content type and, when held, the bearer token.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body text of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::from_status(status, &body));
        }

        Ok(body)
    }

    /// Send a request and decode the JSON response body.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to decode backend response"
            );
            ApiError::Decode(e)
        })
    }

    /// Send a request whose response body is ignored.
    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await.map(drop)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.send_json(self.request(Method::POST, url).json(body))
            .await
    }

    /// Cache handle, only for anonymous requests.
    fn catalog_cache(&self) -> Option<&Cache<CacheKey, CacheValue>> {
        if self.token.is_some() {
            return None;
        }
        self.inner.cache.as_ref()
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration (e.g., the
    /// email is taken) or the request fails.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &AuthRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(&["auth", "register"], request).await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn login(&self, request: &AuthRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(&["auth", "login"], request).await
    }

    /// Fetch the user the bearer token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing, expired, or the request fails.
    #[instrument(skip_all)]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json(&["auth", "me"]).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let key = CacheKey::Products(query.clone());
        if let Some(cache) = self.catalog_cache()
            && let Some(CacheValue::Products(page)) = cache.get(&key).await
        {
            debug!("Cache hit for product listing");
            return Ok((*page).clone());
        }

        let mut url = self.endpoint(&["products"])?;
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let page: Page<Product> = self.send_json(self.request(Method::GET, url)).await?;

        if let Some(cache) = self.catalog_cache() {
            cache
                .insert(key, CacheValue::Products(Arc::new(page.clone())))
                .await;
        }

        Ok(page)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(cache) = self.catalog_cache()
            && let Some(CacheValue::Product(product)) = cache.get(&key).await
        {
            debug!("Cache hit for product");
            return Ok((*product).clone());
        }

        let product: Product = self.get_json(&["products", id.as_str()]).await?;

        if let Some(cache) = self.catalog_cache() {
            cache
                .insert(key, CacheValue::Product(Arc::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// Fetch the variants of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_variants(&self, id: &ProductId) -> Result<Vec<ProductVariant>, ApiError> {
        let key = CacheKey::Variants(id.clone());
        if let Some(cache) = self.catalog_cache()
            && let Some(CacheValue::Variants(variants)) = cache.get(&key).await
        {
            debug!("Cache hit for product variants");
            return Ok((*variants).clone());
        }

        let variants: Vec<ProductVariant> =
            self.get_json(&["products", id.as_str(), "variants"]).await?;

        if let Some(cache) = self.catalog_cache() {
            cache
                .insert(key, CacheValue::Variants(Arc::new(variants.clone())))
                .await;
        }

        Ok(variants)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Create an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn create_cart(&self) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["carts"])?;
        self.send_json(self.request(Method::POST, url)).await
    }

    /// Fetch a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart does not exist or the request fails.
    #[instrument(skip(self), fields(cart_id = %id))]
    pub async fn cart(&self, id: &CartId) -> Result<Cart, ApiError> {
        self.get_json(&["carts", id.as_str()]).await
    }

    /// Add `qty` units of a variant to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the line or the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, variant_id = %variant_id))]
    pub async fn add_cart_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        qty: u32,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "items"])?;
        let body = AddCartItemRequest {
            variant_id: variant_id.clone(),
            qty,
        };
        self.send_empty(self.request(Method::POST, url).json(&body))
            .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, variant_id = %variant_id))]
    pub async fn update_cart_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        qty: u32,
    ) -> Result<(), ApiError> {
        let mut url = self.endpoint(&["carts", cart_id.as_str(), "items", variant_id.as_str()])?;
        url.query_pairs_mut().append_pair("qty", &qty.to_string());
        self.send_empty(self.request(Method::PATCH, url)).await
    }

    /// Remove a line from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, variant_id = %variant_id))]
    pub async fn remove_cart_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["carts", cart_id.as_str(), "items", variant_id.as_str()])?;
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    // =========================================================================
    // Checkout & Order Methods
    // =========================================================================

    /// Bind a cart snapshot to a payment intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the cart or the request fails.
    #[instrument(skip_all, fields(cart_id = %request.cart_id, currency = %request.currency))]
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionResponse, ApiError> {
        self.post_json(&["checkout", "session"], request).await
    }

    /// Orders of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json(&["me", "orders"]).await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is missing, not visible to the token, or
    /// the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.get_json(&["orders", id.as_str()]).await
    }

    /// Backend health report.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip_all)]
    pub async fn health(&self) -> Result<Health, ApiError> {
        self.get_json(&["health"]).await
    }
}
