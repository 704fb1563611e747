//! YooKassa HTTP client.
//!
//! Implements [`PaymentGateway`] against the YooKassa v3 REST API.
//!
//! # Security
//!
//! - Shop credentials are sent as HTTP Basic auth and held in `SecretString`
//! - Provider error bodies are logged here and never returned to callers
//!
//! # Configuration
//!
//! ```ignore
//! let config = YooKassaConfig::new(shop_id, secret_key);
//! let client = YooKassaClient::new(config)?;
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::ports::{
    CreatePaymentRequest, GatewayError, GatewayErrorCode, GatewayPayment, PaymentGateway,
};

use super::wire::{CreatePaymentWire, ErrorWire, PaymentWire};

/// Production API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.yookassa.ru/v3";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// YooKassa shop credentials and endpoint.
#[derive(Clone)]
pub struct YooKassaConfig {
    shop_id: String,
    secret_key: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl YooKassaConfig {
    pub fn new(shop_id: impl Into<String>, secret_key: SecretString) -> Self {
        Self {
            shop_id: shop_id.into(),
            secret_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for YooKassaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YooKassaConfig")
            .field("shop_id", &self.shop_id)
            .field("secret_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// YooKassa payment gateway adapter.
pub struct YooKassaClient {
    config: YooKassaConfig,
    http_client: reqwest::Client,
}

impl YooKassaClient {
    pub fn new(config: YooKassaConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn authorization_header(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.config.shop_id,
            self.config.secret_key.expose_secret()
        );
        format!("Basic {}", STANDARD.encode(credentials))
    }

    async fn read_payment(
        &self,
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<GatewayPayment, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                operation,
                http_status = status.as_u16(),
                body = %body,
                "YooKassa request failed"
            );

            let parsed: ErrorWire = serde_json::from_str(&body).unwrap_or_default();
            let mut error = GatewayError::new(
                GatewayErrorCode::from_http_status(status.as_u16()),
                format!("YooKassa {} failed with HTTP {}", operation, status.as_u16()),
            );
            if let Some(code) = parsed.code {
                error = error.with_provider_code(code);
            }
            return Err(error);
        }

        let payment: PaymentWire = response.json().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Failed to parse YooKassa response");
            GatewayError::invalid_response(format!("Failed to parse YooKassa response: {}", e))
        })?;
        payment.into_gateway_payment()
    }
}

#[async_trait]
impl PaymentGateway for YooKassaClient {
    #[tracing::instrument(skip_all, fields(idempotency_key = %request.idempotency_key))]
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<GatewayPayment, GatewayError> {
        let url = format!("{}/payments", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization_header())
            .header("Idempotence-Key", request.idempotency_key.as_str())
            .json(&CreatePaymentWire::from(&request))
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let payment = self.read_payment(response, "create_payment").await?;
        tracing::info!(
            payment_id = %payment.id,
            status = %payment.status,
            "YooKassa payment created"
        );
        Ok(payment)
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let url = format!("{}/payments/{}", self.config.api_base_url, payment_id);

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization_header())
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::not_found(payment_id));
        }

        self.read_payment(response, "fetch_payment").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{IdempotencyKey, TransactionStatus};
    use crate::domain::foundation::Money;
    use serde_json::json;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> YooKassaClient {
        let config = YooKassaConfig::new("shop_1", SecretString::new("test_secret".to_string()))
            .with_base_url(server.uri());
        YooKassaClient::new(config).unwrap()
    }

    fn request(key: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount: Money::new(99000, "RUB").unwrap(),
            description: "Подписка «Pro»".to_string(),
            return_url: "https://app.example.com/communities/1?payment=success".to_string(),
            idempotency_key: IdempotencyKey::from_stored(key).unwrap(),
            metadata: BTreeMap::from([("transaction_id".to_string(), "t-1".to_string())]),
        }
    }

    fn payment_body(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "status": status,
            "paid": false,
            "amount": {"value": "990.00", "currency": "RUB"},
            "confirmation": {
                "type": "redirect",
                "confirmation_url": format!(
                    "https://yoomoney.ru/checkout/payments/v2/contract?orderId={}",
                    id
                )
            },
            "created_at": "2026-03-01T10:00:00.000Z",
            "test": true
        })
    }

    #[tokio::test]
    async fn create_payment_sends_credentials_and_idempotency_key() {
        let server = MockServer::start().await;
        let expected_auth = format!("Basic {}", STANDARD.encode("shop_1:test_secret"));

        Mock::given(method("POST"))
            .and(path("/payments"))
            .and(header("Authorization", expected_auth.as_str()))
            .and(header("Idempotence-Key", "key-1"))
            .and(body_partial_json(json!({
                "amount": {"value": "990.00", "currency": "RUB"},
                "capture": true,
                "confirmation": {"type": "redirect"},
                "metadata": {"transaction_id": "t-1"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(payment_body("pay_1", "pending")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let payment = client_for(&server)
            .create_payment(request("key-1"))
            .await
            .unwrap();

        assert_eq!(payment.id, "pay_1");
        assert_eq!(payment.status, TransactionStatus::Pending);
        assert_eq!(payment.amount, Money::new(99000, "RUB").unwrap());
        assert!(payment
            .confirmation_url
            .as_deref()
            .is_some_and(|u| u.contains("orderId=pay_1")));
    }

    #[tokio::test]
    async fn provider_error_is_categorized_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "type": "error",
                "code": "invalid_request",
                "description": "Secret detail about the shop"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_payment(request("key-2"))
            .await
            .unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::InvalidRequest);
        assert_eq!(err.provider_code.as_deref(), Some("invalid_request"));
        assert!(!err.retryable);
        assert!(!err.message.contains("Secret detail"));
    }

    #[tokio::test]
    async fn server_errors_are_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_payment(request("key-3"))
            .await
            .unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::ProviderError);
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn fetch_payment_reads_current_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/pay_9"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(payment_body("pay_9", "succeeded")),
            )
            .mount(&server)
            .await;

        let payment = client_for(&server).fetch_payment("pay_9").await.unwrap();
        assert_eq!(payment.status, TransactionStatus::Succeeded);
    }

    #[tokio::test]
    async fn fetch_unknown_payment_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"code": "not_found"})))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_payment("missing").await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::NotFound);
    }

    #[tokio::test]
    async fn garbage_response_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/pay_x"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_payment("pay_x").await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::InvalidResponse);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = YooKassaConfig::new("shop", SecretString::new("hunter2".to_string()));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
