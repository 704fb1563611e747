//! Payment configuration (YooKassa)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::yookassa::{YooKassaConfig, DEFAULT_API_BASE_URL};
use crate::application::{CheckoutSettings, WebhookVerification};

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub yookassa_shop_id: String,

    pub yookassa_secret_key: SecretString,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base of the return URL used when the client sends none.
    pub frontend_base_url: String,

    /// ISO 4217 code tier prices are stored in
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub webhook_verification: WebhookVerification,

    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,
}

impl PaymentConfig {
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    /// Client settings for the YooKassa adapter.
    pub fn yookassa(&self) -> YooKassaConfig {
        YooKassaConfig::new(self.yookassa_shop_id.clone(), self.yookassa_secret_key.clone())
            .with_base_url(self.api_base_url.clone())
            .with_timeout(self.gateway_timeout())
    }

    pub fn checkout(&self) -> CheckoutSettings {
        CheckoutSettings::new(self.frontend_base_url.clone())
    }

    /// Validate payment configuration
    ///
    /// Production needs an HTTPS frontend and gateway-verified webhooks.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.yookassa_shop_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("payment.yookassa_shop_id"));
        }
        if self.yookassa_secret_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("payment.yookassa_secret_key"));
        }
        if !is_http_url(&self.api_base_url) {
            return Err(ValidationError::InvalidUrl("payment.api_base_url"));
        }
        if !is_http_url(&self.frontend_base_url) {
            return Err(ValidationError::InvalidUrl("payment.frontend_base_url"));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if self.gateway_timeout_secs == 0 || self.gateway_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("payment.gateway_timeout_secs"));
        }

        if environment == Environment::Production {
            if !self.frontend_base_url.starts_with("https://") {
                return Err(ValidationError::MustBeHttps("payment.frontend_base_url"));
            }
            if self.webhook_verification != WebhookVerification::Fetch {
                return Err(ValidationError::TrustedWebhooksInProduction);
            }
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty())
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_currency() -> String {
    "RUB".to_string()
}

fn default_gateway_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaymentConfig {
        PaymentConfig {
            yookassa_shop_id: "123456".to_string(),
            yookassa_secret_key: SecretString::new("test_secret".to_string()),
            api_base_url: default_api_base_url(),
            frontend_base_url: "https://school.example.ru".to_string(),
            currency: default_currency(),
            webhook_verification: WebhookVerification::Fetch,
            gateway_timeout_secs: default_gateway_timeout(),
        }
    }

    #[test]
    fn valid_config_passes_in_production() {
        assert!(config().validate(Environment::Production).is_ok());
    }

    #[test]
    fn missing_credentials() {
        let no_shop = PaymentConfig {
            yookassa_shop_id: " ".to_string(),
            ..config()
        };
        assert_eq!(
            no_shop.validate(Environment::Development),
            Err(ValidationError::MissingRequired("payment.yookassa_shop_id"))
        );

        let no_secret = PaymentConfig {
            yookassa_secret_key: SecretString::new(String::new()),
            ..config()
        };
        assert_eq!(
            no_secret.validate(Environment::Development),
            Err(ValidationError::MissingRequired("payment.yookassa_secret_key"))
        );
    }

    #[test]
    fn frontend_must_be_a_url() {
        let bad = PaymentConfig {
            frontend_base_url: "school.example.ru".to_string(),
            ..config()
        };
        assert_eq!(
            bad.validate(Environment::Development),
            Err(ValidationError::InvalidUrl("payment.frontend_base_url"))
        );
    }

    #[test]
    fn plain_http_frontend_only_outside_production() {
        let local = PaymentConfig {
            frontend_base_url: "http://localhost:5173".to_string(),
            ..config()
        };
        assert!(local.validate(Environment::Development).is_ok());
        assert_eq!(
            local.validate(Environment::Production),
            Err(ValidationError::MustBeHttps("payment.frontend_base_url"))
        );
    }

    #[test]
    fn trusted_webhooks_rejected_in_production() {
        let trust = PaymentConfig {
            webhook_verification: WebhookVerification::Trust,
            ..config()
        };
        assert!(trust.validate(Environment::Staging).is_ok());
        assert_eq!(
            trust.validate(Environment::Production),
            Err(ValidationError::TrustedWebhooksInProduction)
        );
    }

    #[test]
    fn currency_must_be_iso_code() {
        for currency in ["rub", "RUBL", ""] {
            let bad = PaymentConfig {
                currency: currency.to_string(),
                ..config()
            };
            assert_eq!(
                bad.validate(Environment::Development),
                Err(ValidationError::InvalidCurrency)
            );
        }
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("test_secret"));
    }
}
