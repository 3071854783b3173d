//! The public REST surface.

pub mod dto;
pub mod error;
pub mod handlers;

use crate::application::checkout::CheckoutLinkService;
use crate::application::normalizer::RequestNormalizer;
use crate::application::notification::NotificationDispatcher;
use crate::application::pix::PixPaymentService;
use axum::Router;
use axum::routing::{get, post};
use handlers::{create_payment, create_preference, health, payment_status, send_email};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Per-process handles shared by every request. Nothing in here is mutated.
#[derive(Clone)]
pub struct AppState {
    pub normalizer: RequestNormalizer,
    pub pix: PixPaymentService,
    pub checkout: CheckoutLinkService,
    pub notifications: NotificationDispatcher,
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/create-payment", post(create_payment))
        .route("/create-preference", post(create_preference))
        .route("/payment-status/{id}", get(payment_status))
        .route("/send-email", post(send_email))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
