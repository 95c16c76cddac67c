//! End-to-end tests for the Ecom storefront.
//!
//! Each test spawns the real storefront router on an ephemeral port, backed
//! by in-memory sessions, and points it at a `wiremock` server standing in
//! for the commerce backend. Requests go through a `reqwest` client with a
//! cookie store so the session cookie is carried between calls, and
//! redirects are not followed so tests can assert on `Location`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ecom-integration-tests
//! ```
//!
//! No database or running backend is needed.

use std::net::SocketAddr;

use reqwest::{Client, Response, redirect::Policy};
use serde_json::{Value, json};
use tower_sessions::MemoryStore;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ecom_storefront::config::StorefrontConfig;
use ecom_storefront::state::AppState;

/// A running storefront wired to a mock backend.
pub struct TestContext {
    /// Mock commerce backend; mount expectations on it.
    pub backend: MockServer,
    /// Browser-like client with a cookie store.
    pub client: Client,
    /// Storefront base URL, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
}

impl TestContext {
    /// Start a mock backend and a storefront in front of it.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn new() -> Self {
        Self::start(false).await
    }

    /// Like [`TestContext::new`], with the `/auth` rate limiter switched on.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn with_rate_limit() -> Self {
        Self::start(true).await
    }

    async fn start(rate_limit: bool) -> Self {
        let backend = MockServer::start().await;
        let api_url =
            Url::parse(&format!("{}/api", backend.uri())).expect("Failed to parse mock URL");

        let mut config = StorefrontConfig::local(api_url);
        config.rate_limit = rate_limit;
        let state = AppState::new(config).expect("Failed to initialize application state");
        let app = ecom_storefront::app(state, MemoryStore::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Storefront server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            backend,
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a storefront page.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// `POST` a urlencoded form, as a plain browser submit.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// `POST` a urlencoded form the way htmx does.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_htmx(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Mount a backend response for `method path`.
    pub async fn mock_json(&self, http_method: &str, api_path: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(api_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.backend)
            .await;
    }

    /// Log in through the storefront as a user the backend accepts.
    ///
    /// # Panics
    ///
    /// Panics if the login does not redirect to the account page.
    pub async fn login_as(&self, email: &str, role: &str, token: &str) {
        self.mock_json(
            "POST",
            "/api/auth/login",
            200,
            json!({"id": "u-1", "email": email, "role": role, "token": token}),
        )
        .await;

        let response = self
            .post_form("/auth/login", &[("email", email), ("password", "password123")])
            .await;
        assert_eq!(location(&response), Some("/account"), "login did not succeed");
    }
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Backend fixtures shaped like the commerce REST API's JSON.
pub mod fixtures {
    use serde_json::{Value, json};

    /// A product with two variants, one of them sold out.
    #[must_use]
    pub fn product(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "description": "Soft and breathable",
            "category": "Clothing",
            "images": [],
            "createdAt": "2025-01-01T00:00:00",
            "updatedAt": "2025-01-02T00:00:00",
            "variants": [
                {"id": "v-1", "sku": "TS-M", "attributes": {"size": "M"}, "price": 10, "inventoryQty": 5, "active": true},
                {"id": "v-2", "sku": "TS-L", "attributes": {"size": "L"}, "price": 12, "inventoryQty": 0, "active": true}
            ],
            "minPrice": 10,
            "maxPrice": 12,
            "totalVariants": 2
        })
    }

    /// A single page of products.
    #[must_use]
    pub fn product_page(products: Vec<Value>) -> Value {
        let total = products.len();
        json!({
            "content": products,
            "totalElements": total,
            "totalPages": 1,
            "size": 20,
            "number": 0
        })
    }

    /// A cart holding `qty` units of variant `v-1` at 10.00 each.
    #[must_use]
    pub fn cart(id: &str, qty: u32) -> Value {
        let items = if qty == 0 {
            json!([])
        } else {
            json!([{
                "id": "ci-1",
                "variantId": "v-1",
                "sku": "TS-M",
                "productTitle": "Organic Cotton Tee",
                "attributes": {"size": "M"},
                "qty": qty,
                "unitPrice": 10,
                "totalPrice": 10 * qty
            }])
        };
        json!({
            "id": id,
            "items": items,
            "subtotal": 10 * qty,
            "discount": 0,
            "total": 10 * qty,
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z",
            "itemCount": qty
        })
    }

    /// An order paid in USD.
    #[must_use]
    pub fn order(id: &str, created_at: &str) -> Value {
        json!({
            "id": id,
            "userId": "u-1",
            "totalCents": 2000,
            "currency": "USD",
            "status": "PAID",
            "paymentIntentId": "pi_1",
            "shippingAddress": {"city": "Springfield"},
            "createdAt": created_at,
            "items": [{"id": "oi-1", "variantId": "v-1", "qty": 2, "unitPriceCents": 1000}]
        })
    }
}
