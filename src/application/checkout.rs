use super::{DEFAULT_PROVIDER_TIMEOUT, bounded};
use crate::domain::intent::CheckoutIntent;
use crate::domain::payment::{BackUrls, CheckoutLink, CheckoutPreference, LineItem};
use crate::domain::ports::CheckoutGatewayRef;
use crate::error::Result;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const CHECKOUT_ITEM_ID: &str = "protocolo-30-dias";
pub const AUTO_RETURN: &str = "approved";

/// Creates hosted card checkouts and hands back the redirect URL.
#[derive(Clone)]
pub struct CheckoutLinkService {
    gateway: CheckoutGatewayRef,
    timeout: Duration,
}

impl CheckoutLinkService {
    pub fn new(gateway: CheckoutGatewayRef) -> Self {
        Self {
            gateway,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn create_checkout_link(&self, intent: &CheckoutIntent) -> Result<CheckoutLink> {
        let preference = CheckoutPreference {
            item: LineItem {
                id: CHECKOUT_ITEM_ID.to_string(),
                title: intent.description.clone(),
                quantity: 1,
                unit_price: intent.amount,
            },
            payer_email: intent.payer_email.clone(),
            back_urls: back_urls(intent),
            auto_return: AUTO_RETURN.to_string(),
        };

        info!(amount = %intent.amount, "Creating checkout preference");
        let checkout = bounded(self.timeout, self.gateway.create_preference(&preference))
            .await
            .inspect_err(|e| warn!(error = %e, "Checkout preference creation failed"))?;
        info!(preference_id = %checkout.id, "Checkout preference created");

        Ok(CheckoutLink {
            init_point: checkout.init_point,
        })
    }
}

/// The three post-payment redirects, each carrying the outcome and the purchase context.
pub fn back_urls(intent: &CheckoutIntent) -> BackUrls {
    let redirect = |status| {
        redirect_url(
            &intent.return_url,
            status,
            intent.payer_email.as_deref(),
            &intent.description,
        )
    };
    BackUrls {
        success: redirect("approved"),
        failure: redirect("failure"),
        pending: redirect("pending"),
    }
}

fn redirect_url(base: &Url, status: &str, email: Option<&str>, description: &str) -> Url {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    {
        // Values are form-encoded; nothing the caller sends can add or split parameters.
        let mut query = url.query_pairs_mut();
        query.append_pair("status", status);
        if let Some(email) = email {
            query.append_pair("email", email);
        }
        query.append_pair("description", description);
    }
    url
}
