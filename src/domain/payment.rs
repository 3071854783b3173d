use super::amount::Amount;
use super::intent::IdempotencyKey;
use super::tax_id::SyntheticTaxId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state reported by the payment processor.
///
/// Unknown states are kept verbatim so the public projection never loses information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Authorized,
    InProcess,
    InMediation,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
    Other(String),
}

impl PaymentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Authorized => "authorized",
            Self::InProcess => "in_process",
            Self::InMediation => "in_mediation",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::ChargedBack => "charged_back",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "authorized" => Self::Authorized,
            "in_process" => Self::InProcess,
            "in_mediation" => Self::InMediation,
            "rejected" => Self::Rejected,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            "charged_back" => Self::ChargedBack,
            _ => Self::Other(s),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tax_id: SyntheticTaxId,
}

/// Everything the processor needs to create one Pix charge.
#[derive(Debug, Clone, PartialEq)]
pub struct PixCharge {
    pub amount: Amount,
    pub description: String,
    pub payer: Payer,
    pub expires_at: DateTime<Utc>,
    pub idempotency_key: IdempotencyKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixTransactionData {
    pub qr_code: String,
    pub qr_code_base64: String,
    pub ticket_url: String,
}

/// A payment as the processor reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPayment {
    pub id: String,
    pub status: PaymentStatus,
    pub status_detail: Option<String>,
    pub pix: Option<PixTransactionData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Amount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackUrls {
    pub success: url::Url,
    pub failure: url::Url,
    pub pending: url::Url,
}

/// A single-item hosted checkout to be created by the processor.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPreference {
    pub item: LineItem,
    pub payer_email: Option<String>,
    pub back_urls: BackUrls,
    pub auto_return: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedCheckout {
    pub id: String,
    pub init_point: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// The stable public shape of a freshly created Pix payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PixPayment {
    pub id: String,
    pub status: PaymentStatus,
    pub qr_code: String,
    pub qr_code_base64: String,
    pub ticket_url: String,
    pub expires_at: DateTime<Utc>,
    pub idempotency_key: IdempotencyKey,
}

/// Read-only projection of gateway state, always re-fetched by id.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentStatusView {
    pub id: String,
    pub status: PaymentStatus,
    pub status_detail: Option<String>,
}

impl From<GatewayPayment> for PaymentStatusView {
    fn from(payment: GatewayPayment) -> Self {
        Self {
            id: payment.id,
            status: payment.status,
            status_detail: payment.status_detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLink {
    pub init_point: String,
}

/// Result of a confirmation e-mail attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationOutcome {
    pub fn sent() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
