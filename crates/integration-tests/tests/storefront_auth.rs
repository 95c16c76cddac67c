//! Login, registration, account, and admin access.

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use ecom_integration_tests::{TestContext, fixtures, location};

// ============================================================================
// Login & Logout
// ============================================================================

#[tokio::test]
async fn test_login_page_renders() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/auth/login").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("name=\"password\""));
}

#[tokio::test]
async fn test_bad_credentials_redirect_with_error() {
    let ctx = TestContext::new().await;
    ctx.mock_json("POST", "/api/auth/login", 401, json!({"message": "Bad credentials"}))
        .await;

    let resp = ctx
        .post_form(
            "/auth/login",
            &[("email", "shopper@example.com"), ("password", "wrong")],
        )
        .await;
    assert_eq!(location(&resp), Some("/auth/login?error=credentials"));

    let body = ctx
        .get("/auth/login?error=credentials")
        .await
        .text()
        .await
        .expect("body");
    assert!(body.contains("Invalid email or password."));
}

#[tokio::test]
async fn test_login_then_account_shows_orders() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/me/orders"))
        .and(header("authorization", "Bearer tok-shopper"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            fixtures::order("o-older", "2025-01-05T10:00:00"),
            fixtures::order("o-newer", "2025-02-05T10:00:00"),
        ])))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    ctx.login_as("shopper@example.com", "CUSTOMER", "tok-shopper")
        .await;

    let resp = ctx.get("/account").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains("shopper@example.com"));
    assert!(body.contains("Customer"));
    assert!(body.contains("$20.00"));

    let newer = body.find("o-newer").expect("newer order listed");
    let older = body.find("o-older").expect("older order listed");
    assert!(newer < older, "orders must be newest first");
}

#[tokio::test]
async fn test_logged_in_visitor_skips_login_page() {
    let ctx = TestContext::new().await;
    ctx.login_as("shopper@example.com", "CUSTOMER", "tok").await;

    let resp = ctx.get("/auth/login").await;
    assert_eq!(location(&resp), Some("/account"));
}

#[tokio::test]
async fn test_logout_clears_auth() {
    let ctx = TestContext::new().await;
    ctx.login_as("shopper@example.com", "CUSTOMER", "tok").await;

    let resp = ctx.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&resp), Some("/auth/login?success=logged_out"));

    let resp = ctx.get("/account").await;
    assert_eq!(location(&resp), Some("/auth/login"));
}

#[tokio::test]
async fn test_failed_logins_are_rate_limited_but_forms_are_not() {
    let ctx = TestContext::with_rate_limit().await;
    ctx.mock_json("POST", "/api/auth/login", 401, json!({"message": "Bad credentials"}))
        .await;
    let credentials = [("email", "shopper@example.com"), ("password", "wrong")];

    // The burst allows five attempts; reloading the form between them is free.
    for _ in 0..5 {
        assert_eq!(ctx.get("/auth/login").await.status(), StatusCode::OK);
        let resp = ctx.post_form("/auth/login", &credentials).await;
        assert_eq!(location(&resp), Some("/auth/login?error=credentials"));
    }

    let resp = ctx.post_form("/auth/login", &credentials).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    // Register shares the same bucket.
    let resp = ctx
        .post_form(
            "/auth/register",
            &[
                ("email", "new@example.com"),
                ("password", "pw"),
                ("password_confirm", "pw"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(ctx.get("/auth/login").await.status(), StatusCode::OK);
    assert_eq!(ctx.get("/auth/register").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_is_not_rate_limited() {
    let ctx = TestContext::with_rate_limit().await;

    for _ in 0..8 {
        let resp = ctx.post_form("/auth/logout", &[]).await;
        assert_eq!(location(&resp), Some("/auth/login?success=logged_out"));
    }
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_password_mismatch() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_form(
            "/auth/register",
            &[
                ("email", "new@example.com"),
                ("password", "one"),
                ("password_confirm", "two"),
            ],
        )
        .await;
    assert_eq!(
        location(&resp),
        Some("/auth/register?error=password_mismatch")
    );
}

#[tokio::test]
async fn test_register_invalid_email() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_form(
            "/auth/register",
            &[
                ("email", "not-an-email"),
                ("password", "pw"),
                ("password_confirm", "pw"),
            ],
        )
        .await;
    assert_eq!(location(&resp), Some("/auth/register?error=invalid_email"));
}

#[tokio::test]
async fn test_register_taken_email() {
    let ctx = TestContext::new().await;
    ctx.mock_json(
        "POST",
        "/api/auth/register",
        409,
        json!({"message": "Email already registered"}),
    )
    .await;

    let resp = ctx
        .post_form(
            "/auth/register",
            &[
                ("email", "taken@example.com"),
                ("password", "pw"),
                ("password_confirm", "pw"),
            ],
        )
        .await;
    assert_eq!(location(&resp), Some("/auth/register?error=email_taken"));
}

#[tokio::test]
async fn test_register_logs_in() {
    let ctx = TestContext::new().await;
    ctx.mock_json(
        "POST",
        "/api/auth/register",
        201,
        json!({"id": "u-9", "email": "new@example.com", "role": "CUSTOMER", "token": "tok-new"}),
    )
    .await;
    ctx.mock_json("GET", "/api/me/orders", 200, json!([])).await;

    let resp = ctx
        .post_form(
            "/auth/register",
            &[
                ("email", "new@example.com"),
                ("password", "pw"),
                ("password_confirm", "pw"),
            ],
        )
        .await;
    assert_eq!(location(&resp), Some("/account"));

    let resp = ctx.get("/account").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.expect("body").contains("new@example.com"));
}

// ============================================================================
// Account
// ============================================================================

#[tokio::test]
async fn test_account_requires_login() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/account").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/auth/login"));
}

#[tokio::test]
async fn test_rejected_token_logs_out() {
    let ctx = TestContext::new().await;
    ctx.mock_json("GET", "/api/me/orders", 401, json!({})).await;
    ctx.login_as("shopper@example.com", "CUSTOMER", "tok-expired")
        .await;

    let resp = ctx.get("/account").await;
    assert_eq!(location(&resp), Some("/auth/login"));

    // The session no longer holds the user.
    ctx.mock_json("GET", "/api/auth/me", 401, json!({})).await;
    let resp = ctx.get("/account").await;
    assert_eq!(location(&resp), Some("/auth/login"));
}

#[tokio::test]
async fn test_order_detail() {
    let ctx = TestContext::new().await;
    ctx.mock_json(
        "GET",
        "/api/orders/o-1",
        200,
        fixtures::order("o-1", "2025-03-04T10:00:00"),
    )
    .await;
    ctx.login_as("shopper@example.com", "CUSTOMER", "tok").await;

    let resp = ctx.get("/account/orders/o-1").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains("Springfield"));
    assert!(body.contains("$10.00"));
    assert!(body.contains("$20.00"));
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let ctx = TestContext::new().await;
    ctx.mock_json("GET", "/api/orders/o-404", 404, json!({})).await;
    ctx.login_as("shopper@example.com", "CUSTOMER", "tok").await;

    assert_eq!(
        ctx.get("/account/orders/o-404").await.status(),
        StatusCode::NOT_FOUND
    );
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_requires_login() {
    let ctx = TestContext::new().await;

    assert_eq!(location(&ctx.get("/admin").await), Some("/auth/login"));
}

#[tokio::test]
async fn test_admin_forbidden_for_customers() {
    let ctx = TestContext::new().await;
    ctx.login_as("shopper@example.com", "CUSTOMER", "tok").await;

    assert_eq!(ctx.get("/admin").await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_dashboard_for_admins() {
    let ctx = TestContext::new().await;
    ctx.login_as("admin@example.com", "ADMIN", "tok-admin").await;

    let resp = ctx.get("/admin").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("body");
    assert!(body.contains("Admin Dashboard"));
    assert!(body.contains("admin@example.com"));
}
