use super::dto::ErrorBody;
use crate::error::PaymentError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// The uniform `{error, details?}` envelope.
///
/// Validation failures are client errors carrying their own message; provider
/// failures are server errors carrying the route's user-facing message, with the
/// provider's description in `details`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                details: None,
            },
        }
    }

    /// Maps a domain error, using `context` as the message for server-side failures.
    pub fn from_payment(err: PaymentError, context: &str) -> Self {
        if err.is_validation() {
            return Self::bad_request(err.to_string());
        }
        let status = match &err {
            PaymentError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(error = %err, "{context}");
        Self {
            status,
            body: ErrorBody {
                error: context.to_string(),
                details: err.details(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
