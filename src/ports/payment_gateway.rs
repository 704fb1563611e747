//! Payment gateway port for the hosted payment provider.
//!
//! The gateway creates one-off payments that redirect the buyer to a hosted
//! confirmation page, and reports payment status on request. Status changes
//! also arrive as webhooks, handled separately.
//!
//! # Design
//!
//! - **Idempotent**: every creation carries the transaction's idempotency key
//! - **Opaque failures**: provider bodies are logged by the adapter, callers
//!   only see a categorized [`GatewayError`]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::billing::{BillingError, IdempotencyKey, TransactionStatus};
use crate::domain::foundation::Money;

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment and obtain its confirmation URL.
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<GatewayPayment, GatewayError>;

    /// Read the current state of a payment.
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}

/// Request to create a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePaymentRequest {
    pub amount: Money,

    /// Shown to the buyer; at most 128 characters.
    pub description: String,

    /// Where the buyer lands after confirming.
    pub return_url: String,

    /// Sent as the `Idempotence-Key` header.
    pub idempotency_key: IdempotencyKey,

    /// Echoed back by the gateway in webhooks.
    pub metadata: BTreeMap<String, String>,
}

/// A payment as the gateway reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    pub status: TransactionStatus,

    /// Present while the payment awaits buyer confirmation.
    pub confirmation_url: Option<String>,

    pub amount: Money,
}

/// A status notification pushed by the gateway, reduced to what the
/// webhook handler needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    /// Gateway event name, e.g. `payment.succeeded`.
    pub event: String,

    pub payment_id: String,

    /// `None` when the gateway reported a status this service does not track.
    pub status: Option<TransactionStatus>,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct GatewayError {
    pub code: GatewayErrorCode,

    /// Safe to show in logs; never contains the provider's raw body.
    pub message: String,

    /// Provider's own error code, if it sent one.
    pub provider_code: Option<String>,

    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn not_found(payment_id: &str) -> Self {
        Self::new(
            GatewayErrorCode::NotFound,
            format!("Payment {} not found", payment_id),
        )
    }
}

impl From<GatewayError> for BillingError {
    fn from(err: GatewayError) -> Self {
        BillingError::upstream(err.to_string())
    }
}

/// Gateway error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Connection failure or timeout.
    NetworkError,

    /// The provider rejected the request as malformed.
    InvalidRequest,

    /// Shop credentials were rejected.
    AuthenticationFailed,

    NotFound,

    RateLimited,

    /// Provider-side failure (5xx).
    ProviderError,

    /// The response could not be understood.
    InvalidResponse,
}

impl GatewayErrorCode {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError
                | GatewayErrorCode::RateLimited
                | GatewayErrorCode::ProviderError
        )
    }

    /// Category for an HTTP status returned by the provider.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 | 422 => GatewayErrorCode::InvalidRequest,
            401 | 403 => GatewayErrorCode::AuthenticationFailed,
            404 => GatewayErrorCode::NotFound,
            429 => GatewayErrorCode::RateLimited,
            _ => GatewayErrorCode::ProviderError,
        }
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::AuthenticationFailed => "authentication_failed",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::RateLimited => "rate_limited",
            GatewayErrorCode::ProviderError => "provider_error",
            GatewayErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn retryable_codes() {
        assert!(GatewayErrorCode::NetworkError.is_retryable());
        assert!(GatewayErrorCode::RateLimited.is_retryable());
        assert!(GatewayErrorCode::ProviderError.is_retryable());

        assert!(!GatewayErrorCode::InvalidRequest.is_retryable());
        assert!(!GatewayErrorCode::AuthenticationFailed.is_retryable());
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(GatewayErrorCode::from_http_status(400), GatewayErrorCode::InvalidRequest);
        assert_eq!(GatewayErrorCode::from_http_status(401), GatewayErrorCode::AuthenticationFailed);
        assert_eq!(GatewayErrorCode::from_http_status(404), GatewayErrorCode::NotFound);
        assert_eq!(GatewayErrorCode::from_http_status(429), GatewayErrorCode::RateLimited);
        assert_eq!(GatewayErrorCode::from_http_status(503), GatewayErrorCode::ProviderError);
    }

    #[test]
    fn error_display_is_code_and_message() {
        let err = GatewayError::network("connection reset").with_provider_code("x");
        assert_eq!(err.to_string(), "network_error: connection reset");
        assert!(err.retryable);
    }

    #[test]
    fn converts_to_upstream_billing_error() {
        let err: BillingError = GatewayError::not_found("pay_1").into();
        assert!(matches!(err, BillingError::Upstream(_)));
    }
}
