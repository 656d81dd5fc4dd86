//! The three checkout strategies through their HTTP endpoints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{HeaderValue, Request, StatusCode};
use checkout_bridge_integration_tests::{
    SERVICE_TOKEN, TestContext, body_json, body_text, location,
};
use serde_json::json;
use wiremock::matchers::{body_json as match_body_json, body_string, header, method, path};
use wiremock::{Mock, ResponseTemplate};

// ============================================================================
// Merchant-API strategy: POST /checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_requires_variant_and_quantity() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.platform)
        .await;

    for body in [json!({"quantity": 1}), json!({"variantId": 1001}), json!({})] {
        let response = ctx.json("POST", "/checkout", &body, &[]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
}

#[tokio::test]
async fn test_checkout_rejects_malformed_json() {
    let ctx = TestContext::new().await;

    let response = ctx
        .send(
            axum::http::Request::post("/checkout")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_uses_service_credential_and_nested_url() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/v1/123456/carts"))
        .and(header("Authentication", format!("bearer {SERVICE_TOKEN}").as_str()))
        .and(match_body_json(json!({
            "email": "ana@example.com",
            "products": [{"variant_id": 1001, "quantity": 2}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 31,
            "checkout": {"url": "https://shop.example/checkout/v3/31"}
        })))
        .expect(1)
        .mount(&ctx.platform)
        .await;

    let response = ctx
        .json(
            "POST",
            "/checkout",
            &json!({"variantId": "1001", "quantity": 2, "email": "ana@example.com"}),
            &[],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"checkoutUrl": "https://shop.example/checkout/v3/31"})
    );
}

#[tokio::test]
async fn test_checkout_does_not_need_a_stored_credential() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/v1/123456/carts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"checkout_url": "https://shop.example/c/1"})),
        )
        .mount(&ctx.platform)
        .await;

    let response = ctx
        .json("POST", "/checkout", &json!({"variantId": 1001, "quantity": 1}), &[])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(ctx.stores.is_empty().await);
}

#[tokio::test]
async fn test_checkout_surfaces_platform_error_body() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/v1/123456/carts"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_string(r#"{"code":422,"description":"Variant 1001 is out of stock"}"#),
        )
        .mount(&ctx.platform)
        .await;

    let response = ctx
        .json("POST", "/checkout", &json!({"variantId": 1001, "quantity": 1}), &[])
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(
        body["details"]
            .as_str()
            .unwrap()
            .contains("Variant 1001 is out of stock")
    );
}

#[tokio::test]
async fn test_checkout_without_url_in_response_fails() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/v1/123456/carts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9})))
        .mount(&ctx.platform)
        .await;

    let response = ctx
        .json("POST", "/checkout", &json!({"variantId": 1001, "quantity": 1}), &[])
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Session-Proxy strategy: POST /bridge
// ============================================================================

#[tokio::test]
async fn test_bridge_without_cookie_makes_no_outbound_call() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/comprar/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.platform)
        .await;

    let response = ctx
        .json("POST", "/bridge", &json!({"variantId": 1001, "quantity": 1}), &[])
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing Cookie header");
}

#[tokio::test]
async fn test_bridge_requires_variant_and_quantity() {
    let ctx = TestContext::new().await;

    let response = ctx
        .json(
            "POST",
            "/bridge",
            &json!({"quantity": 1}),
            &[("cookie", "store_session=abc")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bridge_replays_in_shopper_session() {
    let ctx = TestContext::new().await;
    let origin = ctx.platform.uri();
    Mock::given(method("POST"))
        .and(path("/comprar/"))
        .and(header("cookie", "store_session=abc123; cart=77"))
        .and(header("origin", origin.as_str()))
        .and(body_string("add_to_cart=1001&quantity=2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "cart_count": 2})),
        )
        .expect(1)
        .mount(&ctx.platform)
        .await;

    let response = ctx
        .json(
            "POST",
            "/bridge",
            &json!({"variantId": 1001, "quantity": "2"}),
            &[("cookie", "store_session=abc123; cart=77")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());
    assert_eq!(
        body["tiendanube_response"],
        json!({"success": true, "cart_count": 2})
    );
}

#[tokio::test]
async fn test_bridge_forwards_non_ascii_cookie_verbatim() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/comprar/"))
        .and(|req: &wiremock::Request| {
            req.headers
                .get("cookie")
                .is_some_and(|v| v.as_bytes() == b"s=caf\xe9")
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&ctx.platform)
        .await;

    let request = Request::post("/bridge")
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, HeaderValue::from_bytes(b"s=caf\xe9").unwrap())
        .body(Body::from(json!({"variantId": 1001, "quantity": 1}).to_string()))
        .unwrap();
    let response = ctx.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
}

#[tokio::test]
async fn test_bridge_surfaces_storefront_error() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/comprar/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Sesion invalida"))
        .mount(&ctx.platform)
        .await;

    let response = ctx
        .json(
            "POST",
            "/bridge",
            &json!({"variantId": 1001, "quantity": 1}),
            &[("cookie", "store_session=stale")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["details"], "Sesion invalida");
}

// ============================================================================
// Permalink strategy: GET /comprar/{pairs}
// ============================================================================

#[tokio::test]
async fn test_permalink_redirects_to_store_domain() {
    let ctx = TestContext::new().await;
    ctx.seed_store("777", "tok", Some("shop.example")).await;

    let response = ctx.get("/comprar/1001-2-1002-1?shop=777").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "https://shop.example/cart/add/1001:2,1002:1?storefront=permalink&from_store=1&country=AR"
    );
}

#[tokio::test]
async fn test_permalink_odd_token_defaults_last_quantity() {
    let ctx = TestContext::new().await;
    ctx.seed_store("777", "tok", Some("shop.example")).await;

    let response = ctx.get("/comprar/1001-2-1002?shop=777").await;

    assert_eq!(
        location(&response),
        "https://shop.example/cart/add/1001:2,1002:1?storefront=permalink&from_store=1&country=AR"
    );
}

#[tokio::test]
async fn test_permalink_unknown_store_goes_home() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/comprar/1001-1?shop=999").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "https://front.test");
}

#[tokio::test]
async fn test_permalink_store_without_domain_goes_home() {
    let ctx = TestContext::new().await;
    ctx.seed_store("777", "tok", None).await;

    let response = ctx.get("/comprar/1001-1?shop=777").await;

    assert_eq!(location(&response), "https://front.test");
}

#[tokio::test]
async fn test_permalink_bad_input_is_bad_request() {
    let ctx = TestContext::new().await;

    assert_eq!(
        ctx.get("/comprar/1001-1").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ctx.get("/comprar/1001-x?shop=777").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ctx.get("/comprar/1001--1?shop=777").await.status(),
        StatusCode::BAD_REQUEST
    );
}

// ============================================================================
// Intermediary page: GET /checkout-redirect
// ============================================================================

#[tokio::test]
async fn test_intermediary_page_forwards_to_permalink_route() {
    let ctx = TestContext::new().await;

    let response = ctx
        .get("/checkout-redirect?cart=1001-2-1002-1&shop=777")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("/comprar/1001-2-1002-1?shop=777"));
}

#[tokio::test]
async fn test_intermediary_page_requires_cart_and_shop() {
    let ctx = TestContext::new().await;

    assert_eq!(
        ctx.get("/checkout-redirect?shop=777").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        ctx.get("/checkout-redirect?cart=1001-1").await.status(),
        StatusCode::BAD_REQUEST
    );
}
