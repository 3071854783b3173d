//! Concrete collaborators behind the domain ports.

pub mod in_memory;
pub mod mercadopago;
pub mod resend;

use std::time::Duration;
use tracing::warn;

/// Shared reqwest client for provider calls, bounded by `timeout`.
fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to a default HTTP client without the configured timeout");
            reqwest::Client::new()
        })
}
