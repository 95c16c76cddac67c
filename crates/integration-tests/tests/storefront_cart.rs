//! Cart and checkout flows through the storefront.

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use ecom_integration_tests::{TestContext, fixtures, location};

/// Mount a backend where a new cart `c-1` receives variant `v-1`.
async fn mount_cart_backend(ctx: &TestContext, qty: u32) {
    ctx.mock_json("POST", "/api/carts", 201, fixtures::cart("c-1", 0))
        .await;
    Mock::given(method("POST"))
        .and(path("/api/carts/c-1/items"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&ctx.backend)
        .await;
    ctx.mock_json("GET", "/api/carts/c-1", 200, fixtures::cart("c-1", qty))
        .await;
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_empty_cart_page() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/cart").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("Your cart is empty."));
}

#[tokio::test]
async fn test_cart_count_without_cart_is_zero() {
    let ctx = TestContext::new().await;

    let body = ctx.get("/cart/count").await.text().await.expect("body");
    assert!(body.contains("id=\"cart-count\""));
    assert!(body.contains(">0</span>"));
}

#[tokio::test]
async fn test_add_to_cart_form_redirects_and_persists_cart() {
    let ctx = TestContext::new().await;
    mount_cart_backend(&ctx, 2).await;

    let resp = ctx
        .post_form("/cart/add", &[("variant_id", "v-1"), ("quantity", "2")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/cart"));

    let body = ctx.get("/cart").await.text().await.expect("body");
    assert!(body.contains("Organic Cotton Tee"));
    assert!(body.contains("size: M"));
    assert!(body.contains("$20.00"));

    // The same cart is reused on the next add.
    let resp = ctx.post_form("/cart/add", &[("variant_id", "v-1")]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let creates = ctx
        .backend
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == "/api/carts")
        .count();
    assert_eq!(creates, 1);
}

#[tokio::test]
async fn test_htmx_add_returns_badge_and_trigger() {
    let ctx = TestContext::new().await;
    mount_cart_backend(&ctx, 3).await;

    let resp = ctx
        .post_htmx("/cart/add", &[("variant_id", "v-1"), ("quantity", "3")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["hx-trigger"], "cart-updated");

    let body = resp.text().await.expect("body");
    assert!(body.contains(">3</span>"));
}

#[tokio::test]
async fn test_htmx_add_failure_swaps_error_into_status() {
    let ctx = TestContext::new().await;
    ctx.mock_json("POST", "/api/carts", 500, json!({})).await;

    let resp = ctx.post_htmx("/cart/add", &[("variant_id", "v-1")]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["hx-retarget"], "#cart-add-status");
    assert_eq!(resp.headers()["hx-reswap"], "innerHTML");
    assert!(!resp.headers().contains_key("hx-trigger"));
    assert!(
        resp.text()
            .await
            .expect("body")
            .contains("Error adding to cart")
    );
}

#[tokio::test]
async fn test_add_zero_quantity_is_rejected() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_form("/cart/add", &[("variant_id", "v-1"), ("quantity", "0")])
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let ctx = TestContext::new().await;
    mount_cart_backend(&ctx, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/api/carts/c-1/items/v-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    ctx.post_form("/cart/add", &[("variant_id", "v-1")]).await;

    let resp = ctx
        .post_htmx("/cart/update", &[("variant_id", "v-1"), ("quantity", "0")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["hx-trigger"], "cart-updated");
    assert!(resp.text().await.expect("body").contains("id=\"cart-items\""));
}

#[tokio::test]
async fn test_clear_forgets_cart() {
    let ctx = TestContext::new().await;
    mount_cart_backend(&ctx, 1).await;

    ctx.post_form("/cart/add", &[("variant_id", "v-1")]).await;
    let resp = ctx.post_form("/cart/clear", &[]).await;
    assert_eq!(location(&resp), Some("/cart"));

    let body = ctx.get("/cart").await.text().await.expect("body");
    assert!(body.contains("Your cart is empty."));
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_without_cart_redirects_to_cart() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/checkout").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/cart"));
}

#[tokio::test]
async fn test_checkout_creates_payment_session() {
    let ctx = TestContext::new().await;
    mount_cart_backend(&ctx, 2).await;
    Mock::given(method("POST"))
        .and(path("/api/checkout/session"))
        .and(body_json(json!({
            "cartId": "c-1",
            "currency": "USD",
            "shippingAddress": {
                "name": "Ada Lovelace",
                "line1": "1 Analytical Way",
                "city": "London",
                "postalCode": "N1 9GU",
                "country": "GB"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cartId": "c-1",
            "paymentIntentId": "pi_123",
            "clientSecret": "pi_123_secret_456",
            "amount": 2000,
            "currency": "usd"
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    ctx.post_form("/cart/add", &[("variant_id", "v-1"), ("quantity", "2")])
        .await;

    let form = ctx.get("/checkout").await;
    assert_eq!(form.status(), StatusCode::OK);

    let resp = ctx
        .post_form(
            "/checkout",
            &[
                ("currency", "USD"),
                ("name", "Ada Lovelace"),
                ("line1", "1 Analytical Way"),
                ("line2", ""),
                ("city", "London"),
                ("region", ""),
                ("postal_code", "N1 9GU"),
                ("country", "GB"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains("data-client-secret=\"pi_123_secret_456\""));
    assert!(body.contains("Reference: pi_123"));
    assert!(body.contains("Your payment session is ready."));
    assert!(body.contains("$20.00"));
    assert!(body.contains("(USD)"));
}

#[tokio::test]
async fn test_checkout_rerenders_invalid_form() {
    let ctx = TestContext::new().await;
    mount_cart_backend(&ctx, 1).await;

    ctx.post_form("/cart/add", &[("variant_id", "v-1")]).await;

    let resp = ctx
        .post_form(
            "/checkout",
            &[
                ("currency", "USD"),
                ("name", "Ada Lovelace"),
                ("line1", "1 Analytical Way"),
                ("city", ""),
                ("postal_code", "N1 9GU"),
                ("country", "GB"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("City is required."));
}
