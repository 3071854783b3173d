use crate::application::checkout::CheckoutLinkService;
use crate::application::normalizer::{
    DEFAULT_PLACEHOLDER_EMAIL, MissingEmailPolicy, RequestNormalizer,
};
use crate::application::notification::{
    DEFAULT_ACCESS_URL, DEFAULT_SENDER, NotificationDispatcher,
};
use crate::application::pix::PixPaymentService;
use crate::domain::ports::{CheckoutGatewayRef, MailerRef, PaymentGatewayRef};
use crate::infrastructure::in_memory::{InMemoryGateway, InMemoryMailer};
use crate::infrastructure::mercadopago::{self, MercadoPagoClient};
use crate::infrastructure::resend::{self, ResendClient};
use crate::interfaces::http::AppState;
use clap::{ArgAction, Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmailPolicyArg {
    /// Reject Pix requests that carry no payer e-mail
    Reject,
    /// Substitute the placeholder address
    Placeholder,
}

/// Storefront payment backend: Pix charges, card checkout links and confirmation e-mails.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Settings {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Payment provider access token. Payment routes fail until it is set.
    #[arg(long, env = "MP_ACCESS_TOKEN", hide_env_values = true)]
    pub mp_access_token: Option<String>,

    #[arg(long, env = "MP_API_BASE", default_value = mercadopago::DEFAULT_BASE_URL)]
    pub mp_api_base: String,

    /// Mail provider API key. Confirmation e-mails report failure until it is set.
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    #[arg(long, env = "RESEND_API_BASE", default_value = resend::DEFAULT_BASE_URL)]
    pub resend_api_base: String,

    /// Sender address for confirmation e-mails
    #[arg(long, env = "EMAIL_FROM", default_value = DEFAULT_SENDER)]
    pub email_from: String,

    /// Page the confirmation e-mail links to
    #[arg(long, env = "ACCESS_URL", default_value = DEFAULT_ACCESS_URL)]
    pub access_url: Url,

    /// Upper bound for every provider call, in seconds
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub provider_timeout_secs: u64,

    /// What to do when a Pix request has no payer e-mail
    #[arg(long, env = "MISSING_EMAIL_POLICY", value_enum, default_value_t = EmailPolicyArg::Reject)]
    pub missing_email_policy: EmailPolicyArg,

    #[arg(long, env = "PLACEHOLDER_EMAIL", default_value = DEFAULT_PLACEHOLDER_EMAIL)]
    pub placeholder_email: String,

    /// Report mail failures as `success: false` instead of an error response
    #[arg(long, env = "MASK_NOTIFICATION_FAILURES", default_value_t = true, action = ArgAction::Set)]
    pub mask_notification_failures: bool,

    /// Use in-process payment and mail providers instead of the real ones
    #[arg(long)]
    pub offline: bool,
}

impl Settings {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn missing_email_policy(&self) -> MissingEmailPolicy {
        match self.missing_email_policy {
            EmailPolicyArg::Reject => MissingEmailPolicy::Reject,
            EmailPolicyArg::Placeholder => {
                MissingEmailPolicy::Placeholder(self.placeholder_email.clone())
            }
        }
    }

    /// Wires collaborators and adapters. Missing credentials only produce warnings.
    pub fn build_state(&self) -> AppState {
        let timeout = self.provider_timeout();
        let (payments, checkout, mailer): (PaymentGatewayRef, CheckoutGatewayRef, MailerRef) =
            if self.offline {
                info!("Offline mode: using in-memory payment and mail providers");
                let gateway = InMemoryGateway::new();
                (
                    Arc::new(gateway.clone()),
                    Arc::new(gateway),
                    Arc::new(InMemoryMailer::new()),
                )
            } else {
                let gateway = MercadoPagoClient::new(
                    self.mp_api_base.as_str(),
                    self.mp_access_token.clone(),
                    timeout,
                );
                if !gateway.is_configured() {
                    warn!("MP_ACCESS_TOKEN is not set; payment routes will fail");
                }
                let mailer = ResendClient::new(
                    self.resend_api_base.as_str(),
                    self.resend_api_key.clone(),
                    timeout,
                );
                if !mailer.is_configured() {
                    warn!("RESEND_API_KEY is not set; confirmation e-mails will not be sent");
                }
                (
                    Arc::new(gateway.clone()),
                    Arc::new(gateway),
                    Arc::new(mailer),
                )
            };

        AppState {
            normalizer: RequestNormalizer::new(self.missing_email_policy()),
            pix: PixPaymentService::new(payments).with_timeout(timeout),
            checkout: CheckoutLinkService::new(checkout).with_timeout(timeout),
            notifications: NotificationDispatcher::new(
                mailer,
                self.email_from.clone(),
                self.access_url.clone(),
            )
            .mask_failures(self.mask_notification_failures)
            .with_timeout(timeout),
        }
    }
}
