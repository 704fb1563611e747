//! Mock payment gateway for testing and local runs.
//!
//! Behaves like the real gateway where the billing flow depends on it:
//! - The same idempotency key returns the same payment
//! - New payments start `pending` with a confirmation URL
//! - Statuses can be moved by tests to simulate settlement
//!
//! Errors can be injected for the next call, and all calls are recorded.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::billing::TransactionStatus;
use crate::ports::{CreatePaymentRequest, GatewayError, GatewayPayment, PaymentGateway};

/// In-process `PaymentGateway`.
#[derive(Default)]
pub struct MockPaymentGateway {
    inner: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    payments: HashMap<String, GatewayPayment>,

    /// Idempotency key to payment id.
    by_key: HashMap<String, String>,

    created: Vec<CreatePaymentRequest>,
    fetched: Vec<String>,

    next_error: Option<GatewayError>,
    omit_confirmation_url: bool,
    sequence: u64,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════════

    /// Fail the next call with `error`.
    pub fn fail_next(&self, error: GatewayError) {
        self.state().next_error = Some(error);
    }

    /// Create payments without a confirmation URL.
    pub fn omit_confirmation_url(&self) {
        self.state().omit_confirmation_url = true;
    }

    /// Move a payment to `status`, as if the buyer acted on it.
    pub fn set_status(&self, payment_id: &str, status: TransactionStatus) {
        if let Some(payment) = self.state().payments.get_mut(payment_id) {
            payment.status = status;
            if status != TransactionStatus::Pending {
                payment.confirmation_url = None;
            }
        }
    }

    /// Register a payment the service never created, for webhook tests.
    pub fn insert_payment(&self, payment: GatewayPayment) {
        self.state().payments.insert(payment.id.clone(), payment);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertions
    // ════════════════════════════════════════════════════════════════════════════

    pub fn created_requests(&self) -> Vec<CreatePaymentRequest> {
        self.state().created.clone()
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.state().fetched.clone()
    }

    pub fn payment(&self, payment_id: &str) -> Option<GatewayPayment> {
        self.state().payments.get(payment_id).cloned()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<GatewayPayment, GatewayError> {
        let mut state = self.state();
        state.created.push(request.clone());

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        let key = request.idempotency_key.as_str().to_string();
        if let Some(existing) = state
            .by_key
            .get(&key)
            .and_then(|id| state.payments.get(id))
        {
            return Ok(existing.clone());
        }

        state.sequence += 1;
        let id = format!("mock_pay_{}", state.sequence);
        let confirmation_url = if state.omit_confirmation_url {
            None
        } else {
            Some(format!("https://pay.example.test/confirm/{}", id))
        };
        let payment = GatewayPayment {
            id: id.clone(),
            status: TransactionStatus::Pending,
            confirmation_url,
            amount: request.amount,
        };

        state.by_key.insert(key, id.clone());
        state.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let mut state = self.state();
        state.fetched.push(payment_id.to_string());

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        state
            .payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(payment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::IdempotencyKey;
    use crate::domain::foundation::Money;
    use crate::ports::GatewayErrorCode;
    use std::collections::BTreeMap;

    fn request(key: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount: Money::new(50000, "RUB").unwrap(),
            description: "test".to_string(),
            return_url: "https://app.example.com".to_string(),
            idempotency_key: IdempotencyKey::from_stored(key).unwrap(),
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn same_key_returns_same_payment() {
        let gateway = MockPaymentGateway::new();
        let a = gateway.create_payment(request("k1")).await.unwrap();
        let b = gateway.create_payment(request("k1")).await.unwrap();
        let c = gateway.create_payment(request("k2")).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a.id, c.id);
        assert_eq!(gateway.created_requests().len(), 3);
    }

    #[tokio::test]
    async fn fail_next_affects_one_call() {
        let gateway = MockPaymentGateway::new();
        gateway.fail_next(GatewayError::network("boom"));

        let err = gateway.create_payment(request("k")).await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::NetworkError);
        assert!(gateway.create_payment(request("k")).await.is_ok());
    }

    #[tokio::test]
    async fn set_status_is_visible_to_fetch() {
        let gateway = MockPaymentGateway::new();
        let payment = gateway.create_payment(request("k")).await.unwrap();
        gateway.set_status(&payment.id, TransactionStatus::Succeeded);

        let fetched = gateway.fetch_payment(&payment.id).await.unwrap();
        assert_eq!(fetched.status, TransactionStatus::Succeeded);
        assert!(fetched.confirmation_url.is_none());
        assert_eq!(gateway.fetch_calls(), vec![payment.id]);
    }

    #[tokio::test]
    async fn unknown_payment_is_not_found() {
        let gateway = MockPaymentGateway::new();
        let err = gateway.fetch_payment("nope").await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::NotFound);
    }
}
