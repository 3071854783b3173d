mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{get, post_json, send, test_app, test_app_with};
use nutripay::application::normalizer::MissingEmailPolicy;
use nutripay::domain::payment::PaymentStatus;
use nutripay::domain::tax_id;
use serde_json::json;

#[tokio::test]
async fn test_liveness() {
    let app = test_app();
    let response = send(&app.router, get("/")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!("API NutriOfficial Online 🚀"));
}

#[tokio::test]
async fn test_create_payment_projects_five_fields() {
    let app = test_app();
    let response = send(
        &app.router,
        post_json(
            "/create-payment",
            &json!({"email": "ana@example.com", "amount": "29.90", "description": "Protocolo"}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.body.as_object().unwrap();
    let mut keys: Vec<&str> = body.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["id", "qr_code", "qr_code_base64", "status", "ticket_url"]
    );
    assert_eq!(body["status"], json!("pending"));
    assert!(response.headers.contains_key("x-idempotency-key"));

    let charge = app.gateway.last_charge().await.unwrap();
    assert_eq!(charge.description, "Protocolo");
    assert!(tax_id::validate(charge.payer.tax_id.as_str()));
    let window = charge.expires_at - chrono::Utc::now();
    assert!((1798..=1800).contains(&window.num_seconds()));
}

#[tokio::test]
async fn test_invalid_amount_rejected_before_gateway() {
    let app = test_app();
    for amount in [json!(0), json!("abc"), json!(-10), json!(null)] {
        let response = send(
            &app.router,
            post_json(
                "/create-payment",
                &json!({"email": "ana@example.com", "amount": amount}),
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "amount {amount}");
        assert!(response.body["error"].as_str().unwrap().contains("Amount"));
    }
    assert_eq!(app.gateway.call_count().await, 0);
}

#[tokio::test]
async fn test_missing_email_rejected_in_strict_mode() {
    let app = test_app();
    let response = send(
        &app.router,
        post_json("/create-payment", &json!({"amount": 10})),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.gateway.call_count().await, 0);
}

#[tokio::test]
async fn test_missing_email_uses_placeholder_when_configured() {
    let app = test_app_with(
        MissingEmailPolicy::Placeholder("cliente@email.com".to_string()),
        true,
    );
    let response = send(
        &app.router,
        post_json("/create-payment", &json!({"amount": 10})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let charge = app.gateway.last_charge().await.unwrap();
    assert_eq!(charge.payer.email, "cliente@email.com");
}

#[tokio::test]
async fn test_retry_with_same_idempotency_key_returns_same_payment() {
    let app = test_app();
    let request = || {
        Request::builder()
            .method("POST")
            .uri("/create-payment")
            .header("content-type", "application/json")
            .header("x-idempotency-key", "checkout-attempt-42")
            .body(Body::from(
                json!({"email": "ana@example.com", "amount": 47}).to_string(),
            ))
            .unwrap()
    };

    let first = send(&app.router, request()).await;
    let retry = send(&app.router, request()).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["id"], retry.body["id"]);
    assert_eq!(app.gateway.payment_count().await, 1);
    assert_eq!(
        first.headers["x-idempotency-key"],
        "checkout-attempt-42"
    );
}

#[tokio::test]
async fn test_requests_without_key_create_distinct_payments() {
    let app = test_app();
    let body = json!({"email": "ana@example.com", "amount": 47});
    let first = send(&app.router, post_json("/create-payment", &body)).await;
    let second = send(&app.router, post_json("/create-payment", &body)).await;
    assert_ne!(first.body["id"], second.body["id"]);
    assert_ne!(
        first.headers["x-idempotency-key"],
        second.headers["x-idempotency-key"]
    );
}

#[tokio::test]
async fn test_gateway_failure_is_server_error() {
    let app = test_app();
    app.gateway.set_failing(true).await;
    let response = send(
        &app.router,
        post_json(
            "/create-payment",
            &json!({"email": "ana@example.com", "amount": 10}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], json!("Erro ao gerar Pix"));
    assert!(response.body["details"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_client_error() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/create-payment")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_payment_status() {
    let app = test_app();
    let created = send(
        &app.router,
        post_json(
            "/create-payment",
            &json!({"email": "ana@example.com", "amount": 10}),
        ),
    )
    .await;
    let id = created.body["id"].as_str().unwrap().to_string();
    app.gateway
        .set_status(&id, PaymentStatus::Approved, Some("accredited"))
        .await;

    let response = send(&app.router, get(&format!("/payment-status/{id}"))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"id": id, "status": "approved", "status_detail": "accredited"})
    );
}

#[tokio::test]
async fn test_unknown_payment_status_is_server_error() {
    let app = test_app();
    let response = send(&app.router, get("/payment-status/123")).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], json!("Erro ao consultar status"));
}

#[tokio::test]
async fn test_create_preference_encodes_redirects() {
    let app = test_app();
    let response = send(
        &app.router,
        post_json(
            "/create-preference",
            &json!({
                "amount": 97,
                "description": "Kit & Combo=1",
                "returnUrl": "https://loja.example.com/obrigado",
                "email": "ana@example.com"
            }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["init_point"]
        .as_str()
        .unwrap()
        .starts_with("https://"));

    let preference = app.gateway.last_preference().await.unwrap();
    assert_eq!(preference.item.title, "Kit & Combo=1");
    let success = preference.back_urls.success.as_str();
    assert!(success.contains("status=approved"));
    assert!(success.contains("description=Kit+%26+Combo%3D1"));
    assert!(!success.contains("Kit & Combo"));
}

#[tokio::test]
async fn test_create_preference_gateway_failure_is_server_error() {
    let app = test_app();
    app.gateway.set_failing(true).await;
    let response = send(
        &app.router,
        post_json(
            "/create-preference",
            &json!({"amount": 97, "returnUrl": "https://loja.example.com/obrigado"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body["error"],
        json!("Erro ao criar preferência de cartão")
    );
    assert!(response.body["details"].is_string());
    assert_eq!(app.gateway.call_count().await, 1);
}

#[tokio::test]
async fn test_create_preference_requires_return_url() {
    let app = test_app();
    let response = send(
        &app.router,
        post_json("/create-preference", &json!({"amount": 97})),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.gateway.call_count().await, 0);
}

#[tokio::test]
async fn test_send_email() {
    let app = test_app();
    let response = send(
        &app.router,
        post_json(
            "/send-email",
            &json!({"email": "ana@example.com", "protocolTitle": "Protocolo 30 Dias"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"success": true}));

    let sent = app.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Seu acesso ao Protocolo 30 Dias chegou!");
}

#[tokio::test]
async fn test_send_email_failure_still_ok() {
    let app = test_app();
    app.mailer.set_failing(true).await;
    let response = send(
        &app.router,
        post_json("/send-email", &json!({"email": "ana@example.com"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!(false));
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_send_email_bad_input_still_ok() {
    let app = test_app();
    let response = send(&app.router, post_json("/send-email", &json!({}))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], json!(false));
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_send_email_unmasked_failure() {
    let app = test_app_with(MissingEmailPolicy::Reject, false);
    app.mailer.set_failing(true).await;
    let response = send(
        &app.router,
        post_json("/send-email", &json!({"email": "ana@example.com"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}
