//! Integration test harness for the checkout bridge.
//!
//! Drives the full axum router in-process with `tower::ServiceExt::oneshot`.
//! A `wiremock` server stands in for the platform (authorization server,
//! commerce API and storefront) and the Credential Store lives in memory, so
//! no database or network is needed.
//!
//! ```rust,ignore
//! let ctx = TestContext::new().await;
//! let response = ctx.get("/health").await;
//! assert_eq!(response.status(), StatusCode::OK);
//! ```

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use checkout_bridge::config::{BridgeConfig, ServiceCredential, TiendanubeConfig};
use checkout_bridge::db::{CredentialUpsert, MemoryStoreRepository, StoreRepository};
use checkout_bridge::routes;
use checkout_bridge::state::AppState;
use checkout_bridge_core::StoreId;
use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

/// Frontend home used in every test config.
pub const FRONTEND_URL: &str = "https://front.test";

/// Public URL of the bridge in every test config.
pub const BASE_URL: &str = "https://bridge.test";

/// OAuth client id in every test config.
pub const CLIENT_ID: &str = "4821";

/// Store the Merchant-API strategy creates carts on.
pub const SERVICE_STORE_ID: &str = "123456";

/// Service bearer token for [`SERVICE_STORE_ID`].
pub const SERVICE_TOKEN: &str = "c0ffee1234abcd5678ef90aa11bb22cc";

/// One bridge wired to a mock platform and an in-memory store.
pub struct TestContext {
    /// Mock platform.
    pub platform: MockServer,
    /// Credential Store backing the app.
    pub stores: Arc<MemoryStoreRepository>,
    state: AppState,
}

impl TestContext {
    /// Bridge with open admin routes.
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Bridge whose admin routes require `token`.
    pub async fn with_admin_token(token: &str) -> Self {
        Self::build(Some(token)).await
    }

    async fn build(admin_token: Option<&str>) -> Self {
        let platform = MockServer::start().await;
        let config = config(&platform.uri(), admin_token);
        let stores = Arc::new(MemoryStoreRepository::new());
        let state = AppState::new(config, stores.clone());

        Self {
            platform,
            stores,
            state,
        }
    }

    /// The full application router.
    pub fn app(&self) -> Router {
        routes::app(self.state.clone())
    }

    /// Send one request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app().oneshot(request).await.unwrap()
    }

    /// `GET uri`.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// `method uri` with a JSON body and optional extra headers.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: &Value,
        headers: &[(&str, &str)],
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Store a credential directly, bypassing OAuth.
    pub async fn seed_store(&self, store_id: &str, token: &str, domain: Option<&str>) {
        self.stores
            .upsert_credential(&CredentialUpsert {
                store_id: StoreId::parse(store_id).unwrap(),
                access_token: SecretString::from(token),
                shop_name: "Seeded Shop".to_string(),
                scopes: vec!["read_products".to_string()],
                domain: domain.map(String::from),
                logo: None,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
    }
}

/// Bridge config pointing every platform URL at `platform`.
pub fn config(platform: &str, admin_token: Option<&str>) -> BridgeConfig {
    BridgeConfig {
        database_url: SecretString::from("postgres://unused@localhost/unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: BASE_URL.to_string(),
        frontend_url: FRONTEND_URL.to_string(),
        cors_origins: vec![FRONTEND_URL.to_string()],
        admin_token: admin_token.map(SecretString::from),
        tiendanube: TiendanubeConfig {
            client_id: CLIENT_ID.to_string(),
            client_secret: SecretString::from("9f8a3c1be04d5a7261fc0e8b3d94a6c2"),
            auth_url: platform.to_string(),
            api_url: format!("{platform}/v1"),
            user_agent: "Checkout Bridge Tests (qa@example.com)".to_string(),
            storefront_url: platform.to_string(),
            service: ServiceCredential {
                store_id: StoreId::parse(SERVICE_STORE_ID).unwrap(),
                access_token: SecretString::from(SERVICE_TOKEN),
            },
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Read a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// The `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}
