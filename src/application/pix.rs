use super::{DEFAULT_PROVIDER_TIMEOUT, bounded};
use crate::domain::intent::{IdempotencyKey, PaymentIntent};
use crate::domain::payment::{Payer, PaymentStatusView, PixCharge, PixPayment};
use crate::domain::ports::PaymentGatewayRef;
use crate::domain::tax_id::SyntheticTaxId;
use crate::error::{PaymentError, Result};
use std::time::Duration;
use tracing::{info, warn};

pub const PAYER_FIRST_NAME: &str = "Cliente";
pub const PAYER_LAST_NAME: &str = "NutriOfficial";

/// Creates Pix charges and reads payment state through the payment processor.
///
/// Holds no state of its own: every call goes straight to the injected gateway.
#[derive(Clone)]
pub struct PixPaymentService {
    gateway: PaymentGatewayRef,
    timeout: Duration,
}

impl PixPaymentService {
    pub fn new(gateway: PaymentGatewayRef) -> Self {
        Self {
            gateway,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates one Pix charge for `intent`.
    ///
    /// The same `idempotency_key` must be passed again only when the caller retries
    /// this exact attempt; the processor then returns the original payment instead
    /// of creating a second one.
    pub async fn create_pix_payment(
        &self,
        intent: &PaymentIntent,
        idempotency_key: IdempotencyKey,
    ) -> Result<PixPayment> {
        let charge = PixCharge {
            amount: intent.amount,
            description: intent.description.clone(),
            payer: Payer {
                email: intent.payer_email.clone(),
                first_name: PAYER_FIRST_NAME.to_string(),
                last_name: PAYER_LAST_NAME.to_string(),
                tax_id: SyntheticTaxId::generate(),
            },
            expires_at: intent.expires_at,
            idempotency_key,
        };

        info!(
            idempotency_key = %charge.idempotency_key,
            amount = %charge.amount,
            "Creating pix payment"
        );
        let payment = bounded(self.timeout, self.gateway.create_pix_payment(&charge))
            .await
            .inspect_err(|e| warn!(error = %e, "Pix payment creation failed"))?;

        let pix = payment.pix.ok_or_else(|| {
            PaymentError::gateway("payment response is missing pix transaction data")
        })?;
        info!(payment_id = %payment.id, status = %payment.status, "Pix payment created");

        Ok(PixPayment {
            id: payment.id,
            status: payment.status,
            qr_code: pix.qr_code,
            qr_code_base64: pix.qr_code_base64,
            ticket_url: pix.ticket_url,
            expires_at: charge.expires_at,
            idempotency_key: charge.idempotency_key,
        })
    }

    pub async fn get_payment_status(&self, id: &str) -> Result<PaymentStatusView> {
        if !is_payment_id(id) {
            return Err(PaymentError::InvalidPaymentId);
        }
        let payment = bounded(self.timeout, self.gateway.get_payment(id))
            .await
            .inspect_err(|e| warn!(payment_id = id, error = %e, "Payment lookup failed"))?;
        Ok(payment.into())
    }
}

/// Ids are interpolated into the provider URL path, so only plain tokens are allowed.
fn is_payment_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
