use super::AppState;
use super::dto::{
    CreatePaymentBody, CreatePreferenceBody, PaymentStatusResponse, PixPaymentResponse,
    PreferenceResponse, SendEmailBody,
};
use super::error::ApiError;
use crate::domain::intent::IdempotencyKey;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

const PIX_ERROR: &str = "Erro ao gerar Pix";
const PREFERENCE_ERROR: &str = "Erro ao criar preferência de cartão";
const STATUS_ERROR: &str = "Erro ao consultar status";
const EMAIL_ERROR: &str = "Erro ao enviar e-mail";

pub async fn health() -> &'static str {
    "API NutriOfficial Online 🚀"
}

pub async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreatePaymentBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let intent = state
        .normalizer
        .pix_intent(
            body.amount.as_ref(),
            body.email.as_deref(),
            body.description.as_deref(),
            Utc::now(),
        )
        .map_err(|e| ApiError::from_payment(e, PIX_ERROR))?;

    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(IdempotencyKey::from_caller)
        .unwrap_or_else(IdempotencyKey::generate);

    let payment = state
        .pix
        .create_pix_payment(&intent, idempotency_key)
        .await
        .map_err(|e| ApiError::from_payment(e, PIX_ERROR))?;

    let echoed_key = HeaderValue::from_str(payment.idempotency_key.as_str()).ok();
    let mut response = Json(PixPaymentResponse::from(payment)).into_response();
    if let Some(key) = echoed_key {
        response.headers_mut().insert(IDEMPOTENCY_HEADER, key);
    }
    Ok(response)
}

pub async fn create_preference(
    State(state): State<AppState>,
    body: Result<Json<CreatePreferenceBody>, JsonRejection>,
) -> Result<Json<PreferenceResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let intent = state
        .normalizer
        .checkout_intent(
            body.amount.as_ref(),
            body.email.as_deref(),
            body.description.as_deref(),
            body.return_url.as_deref(),
        )
        .map_err(|e| ApiError::from_payment(e, PREFERENCE_ERROR))?;

    let link = state
        .checkout
        .create_checkout_link(&intent)
        .await
        .map_err(|e| ApiError::from_payment(e, PREFERENCE_ERROR))?;
    Ok(Json(link.into()))
}

pub async fn payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let view = state
        .pix
        .get_payment_status(&id)
        .await
        .map_err(|e| ApiError::from_payment(e, STATUS_ERROR))?;
    Ok(Json(view.into()))
}

/// Always answers 200 while failures are masked; the outcome is in the body.
pub async fn send_email(
    State(state): State<AppState>,
    body: Result<Json<SendEmailBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let dispatcher = &state.notifications;
    let outcome = match body {
        Ok(Json(body)) => {
            match state
                .normalizer
                .notification(body.email.as_deref(), body.protocol_title.as_deref())
            {
                Ok(request) => dispatcher.send_confirmation(&request).await,
                Err(e) => dispatcher.fail(e.to_string()),
            }
        }
        Err(rejection) => dispatcher.fail(rejection.body_text()),
    };

    outcome
        .map(|outcome| Json(outcome).into_response())
        .map_err(|e| ApiError::from_payment(e, EMAIL_ERROR))
}
