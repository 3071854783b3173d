//! JSON bodies of the public HTTP surface.

use crate::domain::payment::{CheckoutLink, PaymentStatusView, PixPayment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentBody {
    pub email: Option<String>,
    /// Number or numeric string.
    pub amount: Option<Value>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceBody {
    pub amount: Option<Value>,
    pub description: Option<String>,
    pub return_url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailBody {
    pub email: Option<String>,
    pub protocol_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PixPaymentResponse {
    pub id: String,
    pub status: String,
    pub qr_code: String,
    pub qr_code_base64: String,
    pub ticket_url: String,
}

impl From<PixPayment> for PixPaymentResponse {
    fn from(payment: PixPayment) -> Self {
        Self {
            id: payment.id,
            status: payment.status.into(),
            qr_code: payment.qr_code,
            qr_code_base64: payment.qr_code_base64,
            ticket_url: payment.ticket_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreferenceResponse {
    pub init_point: String,
}

impl From<CheckoutLink> for PreferenceResponse {
    fn from(link: CheckoutLink) -> Self {
        Self {
            init_point: link.init_point,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,
}

impl From<PaymentStatusView> for PaymentStatusResponse {
    fn from(view: PaymentStatusView) -> Self {
        Self {
            id: view.id,
            status: view.status.into(),
            status_detail: view.status_detail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
