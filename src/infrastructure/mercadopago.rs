//! HTTP client for the Mercado Pago payments and checkout-preference APIs.

use crate::domain::amount::Amount;
use crate::domain::payment::{
    CheckoutPreference, GatewayPayment, HostedCheckout, PaymentStatus, PixCharge,
    PixTransactionData,
};
use crate::domain::ports::{CheckoutGateway, PaymentGateway};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.mercadopago.com";
const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";
const COLLABORATOR: &str = "payment provider";

#[derive(Serialize)]
struct PaymentRequest<'a> {
    transaction_amount: Amount,
    description: &'a str,
    payment_method_id: &'static str,
    payer: PayerRequest<'a>,
    date_of_expiration: String,
}

#[derive(Serialize)]
struct PayerRequest<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    identification: Identification<'a>,
}

#[derive(Serialize)]
struct Identification<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    number: &'a str,
}

/// Payment ids arrive as JSON numbers but are handled as opaque strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProviderId {
    Number(u64),
    Text(String),
}

impl From<ProviderId> for String {
    fn from(id: ProviderId) -> Self {
        match id {
            ProviderId::Number(n) => n.to_string(),
            ProviderId::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct PaymentResponse {
    id: ProviderId,
    status: PaymentStatus,
    status_detail: Option<String>,
    point_of_interaction: Option<PointOfInteraction>,
}

#[derive(Deserialize)]
struct PointOfInteraction {
    transaction_data: Option<TransactionData>,
}

#[derive(Deserialize)]
struct TransactionData {
    qr_code: Option<String>,
    qr_code_base64: Option<String>,
    ticket_url: Option<String>,
}

impl From<PaymentResponse> for GatewayPayment {
    fn from(response: PaymentResponse) -> Self {
        let pix = response
            .point_of_interaction
            .and_then(|poi| poi.transaction_data)
            .and_then(|data| {
                Some(PixTransactionData {
                    qr_code: data.qr_code?,
                    qr_code_base64: data.qr_code_base64?,
                    ticket_url: data.ticket_url?,
                })
            });
        Self {
            id: response.id.into(),
            status: response.status,
            status_detail: response.status_detail,
            pix,
        }
    }
}

#[derive(Serialize)]
struct PreferenceRequest<'a> {
    items: [PreferenceItem<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    payer: Option<PreferencePayer<'a>>,
    back_urls: PreferenceBackUrls<'a>,
    auto_return: &'a str,
}

#[derive(Serialize)]
struct PreferenceItem<'a> {
    id: &'a str,
    title: &'a str,
    quantity: u32,
    unit_price: Amount,
    currency_id: &'static str,
}

#[derive(Serialize)]
struct PreferencePayer<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PreferenceBackUrls<'a> {
    success: &'a str,
    failure: &'a str,
    pending: &'a str,
}

#[derive(Deserialize)]
struct PreferenceResponse {
    id: String,
    init_point: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    #[serde(default)]
    cause: Vec<ErrorCause>,
}

#[derive(Deserialize)]
struct ErrorCause {
    description: Option<String>,
}

/// Picks the most specific description out of a provider error body.
fn describe_error(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|error| {
            error
                .cause
                .into_iter()
                .filter_map(|cause| cause.description)
                .find(|description| !description.trim().is_empty())
                .or(error.message.filter(|message| !message.trim().is_empty()))
        })
        .unwrap_or_else(|| format!("payment provider returned HTTP {}", status.as_u16()))
}

/// Client for the payment processor. Cloning shares the connection pool.
///
/// The access token is optional so the service can start without it; calls made
/// without a token fail with `NotConfigured`.
#[derive(Clone)]
pub struct MercadoPagoClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl MercadoPagoClient {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>, timeout: Duration) -> Self {
        Self {
            http: super::http_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    fn token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or(PaymentError::NotConfigured {
                collaborator: COLLABORATOR,
            })
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::gateway(format!("payment provider unreachable: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::gateway(format!("failed to read provider response: {e}")))?;
        debug!(status = status.as_u16(), "Payment provider responded");

        if !status.is_success() {
            return Err(PaymentError::gateway(describe_error(status, &body)));
        }
        serde_json::from_str(&body)
            .map_err(|e| PaymentError::gateway(format!("unexpected provider response: {e}")))
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    async fn create_pix_payment(&self, charge: &PixCharge) -> Result<GatewayPayment> {
        let token = self.token()?;
        let body = PaymentRequest {
            transaction_amount: charge.amount,
            description: &charge.description,
            payment_method_id: "pix",
            payer: PayerRequest {
                email: &charge.payer.email,
                first_name: &charge.payer.first_name,
                last_name: &charge.payer.last_name,
                identification: Identification {
                    kind: "CPF",
                    number: charge.payer.tax_id.as_str(),
                },
            },
            date_of_expiration: charge
                .expires_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let request = self
            .http
            .post(format!("{}/v1/payments", self.base_url))
            .bearer_auth(token)
            .header(IDEMPOTENCY_HEADER, charge.idempotency_key.as_str())
            .json(&body);
        self.execute::<PaymentResponse>(request).await.map(Into::into)
    }

    async fn get_payment(&self, id: &str) -> Result<GatewayPayment> {
        let token = self.token()?;
        let request = self
            .http
            .get(format!("{}/v1/payments/{id}", self.base_url))
            .bearer_auth(token);
        self.execute::<PaymentResponse>(request).await.map(Into::into)
    }
}

#[async_trait]
impl CheckoutGateway for MercadoPagoClient {
    async fn create_preference(&self, preference: &CheckoutPreference) -> Result<HostedCheckout> {
        let token = self.token()?;
        let body = PreferenceRequest {
            items: [PreferenceItem {
                id: &preference.item.id,
                title: &preference.item.title,
                quantity: preference.item.quantity,
                unit_price: preference.item.unit_price,
                currency_id: "BRL",
            }],
            payer: preference
                .payer_email
                .as_deref()
                .map(|email| PreferencePayer { email }),
            back_urls: PreferenceBackUrls {
                success: preference.back_urls.success.as_str(),
                failure: preference.back_urls.failure.as_str(),
                pending: preference.back_urls.pending.as_str(),
            },
            auto_return: &preference.auto_return,
        };

        let request = self
            .http
            .post(format!("{}/checkout/preferences", self.base_url))
            .bearer_auth(token)
            .json(&body);
        let response: PreferenceResponse = self.execute(request).await?;
        Ok(HostedCheckout {
            id: response.id,
            init_point: response.init_point,
        })
    }
}
