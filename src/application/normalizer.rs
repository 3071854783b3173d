use crate::domain::amount::Amount;
use crate::domain::intent::{CheckoutIntent, NotificationRequest, PaymentIntent, pix_expiry_from};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

pub const DEFAULT_PIX_DESCRIPTION: &str = "NutriOfficial";
pub const DEFAULT_CHECKOUT_TITLE: &str = "Protocolo NutriOfficial";
pub const DEFAULT_PRODUCT_TITLE: &str = "Protocolo";
pub const DEFAULT_PLACEHOLDER_EMAIL: &str = "cliente@email.com";

/// What to do when a Pix request arrives without a payer e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MissingEmailPolicy {
    /// Reject with `MissingEmail`.
    #[default]
    Reject,
    /// Substitute the given address.
    Placeholder(String),
}

/// Validates and coerces raw request fields into intents.
///
/// Rules run in a fixed order (amount, then e-mail, then defaults) so that each
/// failure maps to exactly one rejection. Nothing here touches the network.
#[derive(Debug, Clone, Default)]
pub struct RequestNormalizer {
    missing_email: MissingEmailPolicy,
}

impl RequestNormalizer {
    pub fn new(missing_email: MissingEmailPolicy) -> Self {
        Self { missing_email }
    }

    pub fn pix_intent(
        &self,
        amount: Option<&Value>,
        email: Option<&str>,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PaymentIntent> {
        let amount = parse_amount(amount)?;
        let payer_email = match (present(email), &self.missing_email) {
            (Some(email), _) => well_formed(email)?,
            (None, MissingEmailPolicy::Placeholder(address)) => address.clone(),
            (None, MissingEmailPolicy::Reject) => return Err(PaymentError::MissingEmail),
        };

        Ok(PaymentIntent {
            amount,
            description: present(description)
                .unwrap_or(DEFAULT_PIX_DESCRIPTION)
                .to_string(),
            payer_email,
            created_at: now,
            expires_at: pix_expiry_from(now),
        })
    }

    pub fn checkout_intent(
        &self,
        amount: Option<&Value>,
        email: Option<&str>,
        description: Option<&str>,
        return_url: Option<&str>,
    ) -> Result<CheckoutIntent> {
        let amount = parse_amount(amount)?;
        let payer_email = present(email).map(well_formed).transpose()?;
        let return_url = present(return_url)
            .and_then(|raw| url::Url::parse(raw).ok())
            .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
            .ok_or(PaymentError::InvalidReturnUrl)?;

        Ok(CheckoutIntent {
            amount,
            description: present(description)
                .unwrap_or(DEFAULT_CHECKOUT_TITLE)
                .to_string(),
            payer_email,
            return_url,
        })
    }

    pub fn notification(
        &self,
        email: Option<&str>,
        product_title: Option<&str>,
    ) -> Result<NotificationRequest> {
        let recipient_email = present(email)
            .ok_or(PaymentError::MissingEmail)
            .and_then(well_formed)?;

        Ok(NotificationRequest {
            recipient_email,
            product_title: present(product_title)
                .unwrap_or(DEFAULT_PRODUCT_TITLE)
                .to_string(),
        })
    }
}

fn parse_amount(raw: Option<&Value>) -> Result<Amount> {
    raw.ok_or(PaymentError::InvalidAmount)
        .and_then(Amount::from_json)
}

/// Treats absent and blank fields the same way.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn well_formed(email: &str) -> Result<String> {
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(email.to_string())
        }
        _ => Err(PaymentError::MissingEmail),
    }
}
