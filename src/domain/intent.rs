use super::amount::Amount;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use uuid::Uuid;

/// How long a Pix charge stays payable after creation, in seconds.
pub const PIX_EXPIRY_SECS: i64 = 30 * 60;

pub fn pix_expiry_from(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::seconds(PIX_EXPIRY_SECS)
}

/// A validated request to create a Pix payment. Lives for one request/response cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub amount: Amount,
    pub description: String,
    pub payer_email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A validated request to create a hosted card checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutIntent {
    pub amount: Amount,
    pub description: String,
    pub payer_email: Option<String>,
    pub return_url: url::Url,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub recipient_email: String,
    pub product_title: String,
}

/// Token forwarded to the payment processor so that retries of one logical
/// creation attempt resolve to a single payment object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// A fresh key for a new attempt.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuses a caller-supplied key. Blank input yields `None`.
    pub fn from_caller(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
