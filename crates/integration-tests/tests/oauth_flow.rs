//! OAuth install and callback against a mocked authorization server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use checkout_bridge::db::StoreRepository;
use checkout_bridge_core::StoreId;
use checkout_bridge_integration_tests::{CLIENT_ID, TestContext, body_json, location};
use secrecy::ExposeSecret;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token(platform: &MockServer, code: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/apps/authorize/token"))
        .and(body_partial_json(json!({
            "client_id": CLIENT_ID,
            "grant_type": "authorization_code",
            "code": code,
        })))
        .respond_with(response)
        .mount(platform)
        .await;
}

fn granted(token: &str, store_id: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "token_type": "bearer",
        "scope": "read_products,read_orders,write_orders",
        "user_id": store_id,
    }))
}

// ============================================================================
// Install
// ============================================================================

#[tokio::test]
async fn test_install_without_shop_is_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/install").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing shop parameter");
    assert!(body["hint"].as_str().unwrap().contains("/install?shop="));
}

#[tokio::test]
async fn test_install_redirects_to_authorization() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/install?shop=555").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!(
            "{}/apps/4821/authorize?client_id=4821\
             &redirect_uri=https%3A%2F%2Fbridge.test%2Fcallback\
             &response_type=code&scope=read_products%2Cread_orders%2Cwrite_orders&state=555",
            ctx.platform.uri()
        )
    );
}

// ============================================================================
// Callback
// ============================================================================

#[tokio::test]
async fn test_callback_without_code_is_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/callback").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing code parameter");
}

#[tokio::test]
async fn test_callback_with_denied_authorization_is_bad_request() {
    let ctx = TestContext::new().await;

    let response = ctx
        .get("/callback?error=access_denied&error_description=User%20denied")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "User denied");
}

#[tokio::test]
async fn test_accepted_code_stores_one_record_and_redirects_home() {
    let ctx = TestContext::new().await;
    mount_token(&ctx.platform, "good-code", granted("tok-first", 555)).await;

    let response = ctx.get("/callback?code=good-code").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "https://front.test/?shop=555");
    assert_eq!(ctx.stores.len().await, 1);

    let record = ctx
        .stores
        .find(&StoreId::parse("555").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.access_token.expose_secret(), "tok-first");
    assert_eq!(record.shop_name, "Tienda Nueva");
    assert_eq!(
        record.scopes,
        vec!["read_products", "read_orders", "write_orders"]
    );
}

#[tokio::test]
async fn test_second_exchange_overwrites_the_same_record() {
    let ctx = TestContext::new().await;
    mount_token(&ctx.platform, "first", granted("tok-old", 555)).await;
    mount_token(&ctx.platform, "second", granted("tok-new", 555)).await;

    ctx.get("/callback?code=first").await;
    let response = ctx.get("/callback?code=second").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(ctx.stores.len().await, 1);
    let record = ctx
        .stores
        .find(&StoreId::parse("555").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.access_token.expose_secret(), "tok-new");
}

#[tokio::test]
async fn test_profile_enrichment_fills_domain() {
    let ctx = TestContext::new().await;
    mount_token(&ctx.platform, "code", granted("tok", 888)).await;
    Mock::given(method("GET"))
        .and(path("/v1/888/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "original_domain": "yerbas.mitiendanube.com",
            "domains": ["www.yerbas.com.ar"],
        })))
        .mount(&ctx.platform)
        .await;

    ctx.get("/callback?code=code").await;

    let summary = body_json(ctx.get("/store/888").await).await;
    assert_eq!(summary["domain"], "www.yerbas.com.ar");
    assert!(summary.get("accessToken").is_none());
}

#[tokio::test]
async fn test_rejected_code_echoes_platform_and_writes_nothing() {
    let ctx = TestContext::new().await;
    ctx.seed_store("555", "tok-existing", None).await;
    let platform_body = json!({"error": "invalid_grant", "error_description": "The code expired"});
    mount_token(
        &ctx.platform,
        "expired",
        ResponseTemplate::new(400).set_body_json(platform_body.clone()),
    )
    .await;

    let response = ctx.get("/callback?code=expired").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
    assert_eq!(body["data"], platform_body);

    assert_eq!(ctx.stores.len().await, 1);
    let record = ctx
        .stores
        .find(&StoreId::parse("555").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.access_token.expose_secret(), "tok-existing");
}

#[tokio::test]
async fn test_unreadable_token_response_is_internal_error() {
    let ctx = TestContext::new().await;
    mount_token(
        &ctx.platform,
        "code",
        ResponseTemplate::new(503).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let response = ctx.get("/callback?code=code").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].is_string());
    assert!(ctx.stores.is_empty().await);
}
