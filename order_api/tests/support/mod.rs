#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use common::config::CartConfig;
use common::test_helpers::TestResult;
use http_body_util::BodyExt;
use mockall::mock;
use order_api::{
    executable_utils::{AppState, build_router},
    notifier::{AdminNotifier, AdminUpdate},
    storage::{InMemoryOrderStorage, OrderStorage},
};
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;
use tower::ServiceExt;

mock! {
    pub AdminNotifier {}

    #[async_trait]
    impl AdminNotifier for AdminNotifier {
        async fn notify(&self, update: &AdminUpdate) -> Result<(), Box<dyn Error + Send + Sync>>;
    }
}

/// Notifier that accepts any number of calls.
pub fn quiet_notifier() -> MockAdminNotifier {
    let mut notifier = MockAdminNotifier::new();
    notifier.expect_notify().returning(|_| Ok(()));
    notifier
}

pub fn create_test_app(storage: Arc<dyn OrderStorage>, notifier: MockAdminNotifier) -> Router {
    build_router(AppState::new(storage, Arc::new(notifier), CartConfig::default()))
}

pub fn in_memory_app(notifier: MockAdminNotifier) -> (Router, Arc<InMemoryOrderStorage>) {
    let storage = Arc::new(InMemoryOrderStorage::new());
    (create_test_app(storage.clone(), notifier), storage)
}

pub fn json_request(method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResult<Response<Body>> {
    Ok(app.clone().oneshot(request).await?)
}

pub async fn body_json(response: Response<Body>) -> TestResult<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

/// The `name=value` pair of a `Set-Cookie` header, ready to be sent back.
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// The cart the server decodes from an `orders=...` cookie pair.
pub async fn fetch_cart(app: &Router, cookie: &str) -> TestResult<Value> {
    body_json(send(app, empty_request("GET", "/api/orders/cart", Some(cookie))).await?).await
}
