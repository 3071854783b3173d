//! Application layer: request normalization and the provider adapters.
//!
//! Every adapter is a stateless proxy over an injected collaborator handle. Each
//! provider call is a single await bounded by the configured timeout; nothing is
//! retried here, retry policy belongs to the caller.

pub mod checkout;
pub mod normalizer;
pub mod notification;
pub mod pix;

use crate::error::{PaymentError, Result};
use std::future::Future;
use std::time::Duration;

/// Timeout applied to provider calls when none is configured.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

async fn bounded<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
        Err(PaymentError::gateway(format!(
            "provider did not respond within {}s",
            limit.as_secs_f32()
        )))
    })
}
