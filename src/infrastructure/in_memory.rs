use crate::domain::intent::IdempotencyKey;
use crate::domain::payment::{
    CheckoutPreference, GatewayPayment, HostedCheckout, OutboundEmail, PaymentStatus, PixCharge,
    PixTransactionData,
};
use crate::domain::ports::{CheckoutGateway, Mailer, PaymentGateway};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const SANDBOX_BASE: &str = "https://sandbox.nutripay.local";

#[derive(Default)]
struct GatewayState {
    payments: HashMap<String, GatewayPayment>,
    by_key: HashMap<IdempotencyKey, String>,
    charges: Vec<PixCharge>,
    preferences: Vec<CheckoutPreference>,
    next_id: u64,
    calls: usize,
    failing: bool,
}

/// An in-process stand-in for the payment processor.
///
/// Honours idempotency keys the way the real processor does: a repeated key
/// returns the payment created by the first call. Used by tests and by the
/// `--offline` mode.
#[derive(Default, Clone)]
pub struct InMemoryGateway {
    state: Arc<RwLock<GatewayState>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail with a gateway error.
    pub async fn set_failing(&self, failing: bool) {
        self.state.write().await.failing = failing;
    }

    /// Moves a stored payment to another status, as a webhook-driven update would.
    pub async fn set_status(&self, id: &str, status: PaymentStatus, detail: Option<&str>) {
        if let Some(payment) = self.state.write().await.payments.get_mut(id) {
            payment.status = status;
            payment.status_detail = detail.map(str::to_string);
        }
    }

    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }

    /// Number of calls that reached this gateway, successful or not.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls
    }

    pub async fn last_charge(&self) -> Option<PixCharge> {
        self.state.read().await.charges.last().cloned()
    }

    pub async fn last_preference(&self) -> Option<CheckoutPreference> {
        self.state.read().await.preferences.last().cloned()
    }

    fn check(state: &mut GatewayState) -> Result<()> {
        state.calls += 1;
        if state.failing {
            Err(PaymentError::gateway("in-memory gateway configured to fail"))
        } else {
            Ok(())
        }
    }

    fn next_id(state: &mut GatewayState) -> String {
        state.next_id += 1;
        (1_000_000_000 + state.next_id).to_string()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_pix_payment(&self, charge: &PixCharge) -> Result<GatewayPayment> {
        let mut state = self.state.write().await;
        Self::check(&mut state)?;
        state.charges.push(charge.clone());

        if let Some(existing) = state
            .by_key
            .get(&charge.idempotency_key)
            .and_then(|id| state.payments.get(id))
        {
            return Ok(existing.clone());
        }

        let id = Self::next_id(&mut state);
        let payment = GatewayPayment {
            id: id.clone(),
            status: PaymentStatus::Pending,
            status_detail: Some("pending_waiting_transfer".to_string()),
            pix: Some(PixTransactionData {
                qr_code: format!("00020126580014br.gov.bcb.pix0136{id}5204000053039865406{}", charge.amount),
                qr_code_base64: format!("iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB{id}"),
                ticket_url: format!("{SANDBOX_BASE}/pix/{id}"),
            }),
        };
        state
            .by_key
            .insert(charge.idempotency_key.clone(), id.clone());
        state.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn get_payment(&self, id: &str) -> Result<GatewayPayment> {
        let mut state = self.state.write().await;
        Self::check(&mut state)?;
        state
            .payments
            .get(id)
            .cloned()
            .ok_or_else(|| PaymentError::gateway(format!("Payment not found: {id}")))
    }
}

#[async_trait]
impl CheckoutGateway for InMemoryGateway {
    async fn create_preference(&self, preference: &CheckoutPreference) -> Result<HostedCheckout> {
        let mut state = self.state.write().await;
        Self::check(&mut state)?;
        state.preferences.push(preference.clone());
        let id = format!("pref-{}", Self::next_id(&mut state));
        Ok(HostedCheckout {
            init_point: format!("{SANDBOX_BASE}/checkout/{id}"),
            id,
        })
    }
}

/// Collects outbound e-mails instead of delivering them.
#[derive(Default, Clone)]
pub struct InMemoryMailer {
    sent: Arc<RwLock<Vec<OutboundEmail>>>,
    failing: Arc<RwLock<bool>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        if *self.failing.read().await {
            return Err(PaymentError::gateway("in-memory mailer configured to fail"));
        }
        self.sent.write().await.push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{BackUrls, LineItem, Payer};
    use crate::domain::tax_id::SyntheticTaxId;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn charge(key: &IdempotencyKey) -> PixCharge {
        PixCharge {
            amount: dec!(10).try_into().unwrap(),
            description: "NutriOfficial".to_string(),
            payer: Payer {
                email: "ana@example.com".to_string(),
                first_name: "Cliente".to_string(),
                last_name: "NutriOfficial".to_string(),
                tax_id: SyntheticTaxId::generate(),
            },
            expires_at: Utc::now(),
            idempotency_key: key.clone(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_gateway_idempotency() {
        let gateway = InMemoryGateway::new();
        let key = IdempotencyKey::generate();

        let first = gateway.create_pix_payment(&charge(&key)).await.unwrap();
        let second = gateway.create_pix_payment(&charge(&key)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(gateway.payment_count().await, 1);
        assert_eq!(gateway.call_count().await, 2);

        let fetched = gateway.get_payment(&first.id).await.unwrap();
        assert_eq!(fetched, first);
    }

    #[tokio::test]
    async fn test_in_memory_gateway_failure_mode() {
        let gateway = InMemoryGateway::new();
        gateway.set_failing(true).await;
        let result = gateway
            .create_pix_payment(&charge(&IdempotencyKey::generate()))
            .await;
        assert!(matches!(result, Err(PaymentError::Gateway { .. })));
        assert_eq!(gateway.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_in_memory_preferences() {
        let gateway = InMemoryGateway::new();
        let base = url::Url::parse("https://loja.example.com/").unwrap();
        let preference = CheckoutPreference {
            item: LineItem {
                id: "protocolo-30-dias".to_string(),
                title: "Protocolo".to_string(),
                quantity: 1,
                unit_price: dec!(97).try_into().unwrap(),
            },
            payer_email: None,
            back_urls: BackUrls {
                success: base.clone(),
                failure: base.clone(),
                pending: base,
            },
            auto_return: "approved".to_string(),
        };

        let a = gateway.create_preference(&preference).await.unwrap();
        let b = gateway.create_preference(&preference).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.init_point.ends_with(&a.id));
    }

    #[tokio::test]
    async fn test_in_memory_mailer() {
        let mailer = InMemoryMailer::new();
        let email = OutboundEmail {
            from: "a@example.com".to_string(),
            to: "b@example.com".to_string(),
            subject: "Oi".to_string(),
            html: "<p>Oi</p>".to_string(),
        };
        mailer.send(&email).await.unwrap();
        mailer.set_failing(true).await;
        assert!(mailer.send(&email).await.is_err());
        assert_eq!(mailer.sent().await, vec![email]);
    }
}
