//! Integration tests for `ApiClient` against a mock backend.
//!
//! Each test stands up a `wiremock` server mounted under `/api` so the
//! client's path joining is exercised the same way as against the real
//! backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ecom_core::{
    AuthRequest, CartId, CheckoutSessionRequest, OrderId, OrderStatus, ProductId, ProductQuery,
    UserRole, VariantId,
};
use ecom_storefront::api::{ApiClient, ApiError};
use ecom_storefront::config::BackendConfig;

fn backend_config(server: &MockServer, cache_ttl: Duration) -> BackendConfig {
    BackendConfig {
        api_url: Url::parse(&format!("{}/api", server.uri())).unwrap(),
        timeout: Duration::from_secs(5),
        catalog_cache_ttl: cache_ttl,
    }
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&backend_config(server, Duration::ZERO)).unwrap()
}

fn product_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Wireless Headphones",
        "description": "Over-ear, noise cancelling",
        "category": "Electronics",
        "images": ["https://img.example.com/headphones.jpg"],
        "createdAt": "2025-01-01T00:00:00",
        "updatedAt": "2025-01-01T00:00:00",
        "variants": [],
        "minPrice": 99.99,
        "maxPrice": 129.99,
        "totalVariants": 2
    })
}

fn cart_json(id: &str, item_count: u32) -> serde_json::Value {
    json!({
        "id": id,
        "items": [],
        "subtotal": 0,
        "discount": 0,
        "total": 0,
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z",
        "itemCount": item_count
    })
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_carry_json_content_type_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-1",
            "email": "shopper@example.com",
            "role": "CUSTOMER",
            "createdAt": "2025-02-01T12:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server)
        .with_token(SecretString::from("tok-abc"))
        .current_user()
        .await
        .unwrap();

    assert_eq!(user.email, "shopper@example.com");
    assert_eq!(user.role, UserRole::Customer);
}

#[tokio::test]
async fn anonymous_requests_have_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).current_user().await.unwrap_err();
    assert!(err.is_unauthorized(), "expected 401, got: {err:?}");
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[tokio::test]
async fn products_sends_only_non_empty_query_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("category", "Home & Kitchen"))
        .and(query_param("size", "20"))
        .and(query_param_is_missing("search"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [product_json("p-1")],
            "totalElements": 1,
            "totalPages": 1,
            "size": 20,
            "number": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ProductQuery::new(
        Some(String::new()),
        Some("Home & Kitchen".to_string()),
        0,
        20,
    );
    let page = client(&server).products(&query).await.unwrap();

    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].title, "Wireless Headphones");
    assert!(!page.has_next());
}

#[tokio::test]
async fn product_not_found_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Product not found"))
        .mount(&server)
        .await;

    let err = client(&server)
        .product(&ProductId::new("missing"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Product not found");
}

#[tokio::test]
async fn product_variants_decodes_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/p-1/variants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "v-1", "sku": "HP-BLK", "attributes": {"color": "Black"}, "price": 99.99, "inventoryQty": 3, "active": true},
            {"id": "v-2", "sku": "HP-WHT", "attributes": {"color": "White"}, "price": 129.99, "inventoryQty": 0, "active": true}
        ])))
        .mount(&server)
        .await;

    let variants = client(&server)
        .product_variants(&ProductId::new("p-1"))
        .await
        .unwrap();

    assert_eq!(variants.len(), 2);
    assert!(variants[0].in_stock());
    assert!(!variants[1].in_stock());
}

#[tokio::test]
async fn anonymous_catalogue_reads_are_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json("p-1")))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&backend_config(&server, Duration::from_secs(60))).unwrap();
    let id = ProductId::new("p-1");

    let first = api.product(&id).await.unwrap();
    let second = api.product(&id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn authenticated_catalogue_reads_bypass_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json("p-1")))
        .expect(2)
        .mount(&server)
        .await;

    let api = ApiClient::new(&backend_config(&server, Duration::from_secs(60)))
        .unwrap()
        .with_token(SecretString::from("tok"));
    let id = ProductId::new("p-1");

    api.product(&id).await.unwrap();
    api.product(&id).await.unwrap();
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_cart_item_posts_camel_case_body_and_accepts_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/carts/c-1/items"))
        .and(body_json(json!({"variantId": "v-1", "qty": 2})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .add_cart_item(&CartId::new("c-1"), &VariantId::new("v-1"), 2)
        .await
        .unwrap();
}

#[tokio::test]
async fn update_cart_item_patches_with_qty_query() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/carts/c-1/items/v-1"))
        .and(query_param("qty", "5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .update_cart_item(&CartId::new("c-1"), &VariantId::new("v-1"), 5)
        .await
        .unwrap();
}

#[tokio::test]
async fn remove_cart_item_sends_delete() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/carts/c-1/items/v-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .remove_cart_item(&CartId::new("c-1"), &VariantId::new("v-1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn create_cart_decodes_new_cart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/carts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(cart_json("c-9", 0)))
        .expect(1)
        .mount(&server)
        .await;

    let cart = client(&server).create_cart().await.unwrap();
    assert_eq!(cart.id, CartId::new("c-9"));
    assert!(cart.is_empty());
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn error_without_body_uses_status_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/carts/c-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).cart(&CartId::new("c-1")).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/carts/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\":"))
        .mount(&server)
        .await;

    let err = client(&server).cart(&CartId::new("c-1")).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got: {err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let config = BackendConfig {
        api_url: Url::parse("http://127.0.0.1:9/api").unwrap(),
        timeout: Duration::from_secs(2),
        catalog_cache_ttl: Duration::ZERO,
    };
    let err = ApiClient::new(&config).unwrap().health().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// Auth, checkout, orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_posts_credentials_and_returns_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "admin@example.com", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-1",
            "email": "admin@example.com",
            "role": "ADMIN",
            "token": "jwt-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .login(&AuthRequest {
            email: "admin@example.com".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.token, "jwt-token");
    assert_eq!(response.role, UserRole::Admin);
}

#[tokio::test]
async fn checkout_session_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/checkout/session"))
        .and(body_json(json!({
            "cartId": "c-1",
            "currency": "USD",
            "shippingAddress": {"city": "Springfield"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cartId": "c-1",
            "paymentIntentId": "pi_1",
            "clientSecret": "pi_1_secret",
            "amount": 2599,
            "currency": "usd"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CheckoutSessionRequest {
        cart_id: CartId::new("c-1"),
        currency: "USD".to_string(),
        shipping_address: [("city".to_string(), "Springfield".to_string())].into(),
    };
    let session = client(&server)
        .create_checkout_session(&request)
        .await
        .unwrap();

    assert_eq!(session.payment_intent_id, "pi_1");
    assert_eq!(session.amount_due().display(), "$25.99");
}

#[tokio::test]
async fn orders_and_order_detail() {
    let server = MockServer::start().await;
    let order = json!({
        "id": "o-1",
        "userId": "u-1",
        "totalCents": 2599,
        "currency": "USD",
        "status": "PAID",
        "shippingAddress": {},
        "createdAt": "2025-03-01T09:30:00",
        "items": [{"id": "oi-1", "variantId": "v-1", "qty": 1, "unitPriceCents": 2599}]
    });

    Mock::given(method("GET"))
        .and(path("/api/me/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/o-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order))
        .mount(&server)
        .await;

    let api = client(&server).with_token(SecretString::from("tok"));
    let orders = api.orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Paid);

    let detail = api.order(&OrderId::new("o-1")).await.unwrap();
    assert_eq!(detail.total().display(), "$25.99");
}

#[tokio::test]
async fn health_reports_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "UP",
            "message": "Ecom Engine is running",
            "timestamp": 1_735_689_600_000_i64
        })))
        .mount(&server)
        .await;

    assert!(client(&server).health().await.unwrap().is_up());
}
