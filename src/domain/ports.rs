use super::payment::{CheckoutPreference, GatewayPayment, HostedCheckout, OutboundEmail, PixCharge};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The payment processor's direct-payment API.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a Pix charge. Repeated calls with the same idempotency key must
    /// resolve to the same payment.
    async fn create_pix_payment(&self, charge: &PixCharge) -> Result<GatewayPayment>;
    async fn get_payment(&self, id: &str) -> Result<GatewayPayment>;
}

/// The payment processor's hosted-checkout API.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_preference(&self, preference: &CheckoutPreference) -> Result<HostedCheckout>;
}

/// The transactional mail provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type CheckoutGatewayRef = Arc<dyn CheckoutGateway>;
pub type MailerRef = Arc<dyn Mailer>;
