use crate::domain::payment::OutboundEmail;
use crate::domain::ports::Mailer;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Client for the Resend transactional e-mail API.
#[derive(Clone)]
pub struct ResendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ResendClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            http: super::http_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Mailer for ResendClient {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let api_key = self.api_key.as_deref().ok_or(PaymentError::NotConfigured {
            collaborator: "mail provider",
        })?;
        let body = SendRequest {
            from: &email.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::gateway(format!("mail provider unreachable: {e}")))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::gateway(format!("failed to read mail provider response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|error| error.message)
                .unwrap_or_else(|| format!("mail provider returned HTTP {}", status.as_u16()));
            return Err(PaymentError::gateway(message));
        }

        let id = serde_json::from_str::<SendResponse>(&text)
            .ok()
            .and_then(|response| response.id);
        debug!(email_id = ?id, "Mail provider accepted message");
        Ok(())
    }
}
