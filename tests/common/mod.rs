#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use nutripay::application::checkout::CheckoutLinkService;
use nutripay::application::normalizer::{MissingEmailPolicy, RequestNormalizer};
use nutripay::application::notification::{DEFAULT_SENDER, NotificationDispatcher};
use nutripay::application::pix::PixPaymentService;
use nutripay::infrastructure::in_memory::{InMemoryGateway, InMemoryMailer};
use nutripay::interfaces::http::{AppState, create_routes};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub gateway: InMemoryGateway,
    pub mailer: InMemoryMailer,
}

pub fn test_app() -> TestApp {
    test_app_with(MissingEmailPolicy::Reject, true)
}

pub fn test_app_with(policy: MissingEmailPolicy, mask_failures: bool) -> TestApp {
    let gateway = InMemoryGateway::new();
    let mailer = InMemoryMailer::new();
    let state = AppState {
        normalizer: RequestNormalizer::new(policy),
        pix: PixPaymentService::new(Arc::new(gateway.clone())),
        checkout: CheckoutLinkService::new(Arc::new(gateway.clone())),
        notifications: NotificationDispatcher::new(
            Arc::new(mailer.clone()),
            DEFAULT_SENDER,
            url::Url::parse("https://loja.example.com/acesso").unwrap(),
        )
        .mask_failures(mask_failures),
    };
    TestApp {
        router: create_routes(state),
        gateway,
        mailer,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
