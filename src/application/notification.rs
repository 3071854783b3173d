use super::{DEFAULT_PROVIDER_TIMEOUT, bounded};
use crate::domain::intent::NotificationRequest;
use crate::domain::payment::{NotificationOutcome, OutboundEmail};
use crate::domain::ports::MailerRef;
use crate::error::{PaymentError, Result};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_SENDER: &str = "NutriOfficial <acesso@nutriofficial.com>";
pub const DEFAULT_ACCESS_URL: &str = "https://nutriofficial.com/acesso";

/// Sends the post-purchase confirmation e-mail.
///
/// With `mask_failures` set (the default), provider failures are reported as
/// `success: false` and never returned as errors, so a mail outage cannot block
/// the purchase flow.
#[derive(Clone)]
pub struct NotificationDispatcher {
    mailer: MailerRef,
    sender: String,
    access_url: Url,
    mask_failures: bool,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(mailer: MailerRef, sender: impl Into<String>, access_url: Url) -> Self {
        Self {
            mailer,
            sender: sender.into(),
            access_url,
            mask_failures: true,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn mask_failures(mut self, mask: bool) -> Self {
        self.mask_failures = mask;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn masks_failures(&self) -> bool {
        self.mask_failures
    }

    pub async fn send_confirmation(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationOutcome> {
        let email = self.compose(request);
        match bounded(self.timeout, self.mailer.send(&email)).await {
            Ok(()) => {
                info!("Confirmation e-mail sent");
                debug!(recipient = %request.recipient_email, "Confirmation e-mail recipient");
                Ok(NotificationOutcome::sent())
            }
            Err(e) => {
                let reason = match e {
                    PaymentError::Gateway { message } => message,
                    other => other.to_string(),
                };
                warn!(error = %reason, "Confirmation e-mail failed");
                self.fail(reason)
            }
        }
    }

    /// Applies the masking policy to a failure that happened before or during sending.
    pub fn fail(&self, reason: impl Into<String>) -> Result<NotificationOutcome> {
        let reason = reason.into();
        if self.mask_failures {
            Ok(NotificationOutcome::failed(reason))
        } else {
            Err(PaymentError::NotificationFailure(reason))
        }
    }

    pub fn compose(&self, request: &NotificationRequest) -> OutboundEmail {
        let link = access_link(
            &self.access_url,
            &request.recipient_email,
            &request.product_title,
        );
        OutboundEmail {
            from: self.sender.clone(),
            to: request.recipient_email.clone(),
            subject: format!("Seu acesso ao {} chegou!", request.product_title),
            html: render_confirmation(&request.product_title, &link),
        }
    }
}

fn access_link(base: &Url, email: &str, product: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("email", email)
        .append_pair("produto", product);
    url
}

fn render_confirmation(product_title: &str, link: &Url) -> String {
    let title = escape_html(product_title);
    let link = escape_html(link.as_str());
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; color: #333;">
  <h1 style="color: #16a34a;">Pagamento confirmado!</h1>
  <p>Olá! Obrigado pela sua compra do <strong>{title}</strong>.</p>
  <p>Seu acesso já está liberado. Clique no botão abaixo para começar:</p>
  <p style="text-align: center; margin: 32px 0;">
    <a href="{link}" style="background: #16a34a; color: #fff; padding: 14px 28px; border-radius: 8px; text-decoration: none; font-weight: bold;">Acessar meu {title}</a>
  </p>
  <p style="font-size: 12px; color: #888;">Se o botão não funcionar, copie e cole este link no navegador:<br>{link}</p>
</div>"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
