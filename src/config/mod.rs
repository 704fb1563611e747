//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `COURSE_BILLING` prefix; nested values are separated by `__`.
//!
//! ```no_run
//! use course_billing::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod payment;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::adapters::http::HttpSettings;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub payment: PaymentConfig,

    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file is loaded first when present.
    ///
    /// - `COURSE_BILLING__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COURSE_BILLING__PAYMENT__YOOKASSA_SHOP_ID=...` -> `payment.yookassa_shop_id`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COURSE_BILLING")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all sections against the configured environment.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let environment = self.server.environment;
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate(environment)?;
        self.auth.validate(environment)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            cors_origins: self.server.cors_origins_list(),
            request_timeout: self.server.request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::WebhookVerification;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[(&str, &str)] = &[
        ("COURSE_BILLING__DATABASE__URL", "postgresql://test@localhost/billing"),
        ("COURSE_BILLING__PAYMENT__YOOKASSA_SHOP_ID", "123456"),
        ("COURSE_BILLING__PAYMENT__YOOKASSA_SECRET_KEY", "test_secret"),
        ("COURSE_BILLING__PAYMENT__FRONTEND_BASE_URL", "https://school.example.ru"),
        ("COURSE_BILLING__AUTH__JWT_SECRET", "dev-secret"),
    ];

    const OPTIONAL: &[&str] = &[
        "COURSE_BILLING__SERVER__PORT",
        "COURSE_BILLING__SERVER__ENVIRONMENT",
        "COURSE_BILLING__PAYMENT__WEBHOOK_VERIFICATION",
    ];

    fn set_minimal_env() {
        for (key, value) in VARS {
            env::set_var(key, value);
        }
    }

    fn clear_env() {
        for (key, _) in VARS {
            env::remove_var(key);
        }
        for key in OPTIONAL {
            env::remove_var(key);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn loads_from_environment_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.database.url, "postgresql://test@localhost/billing");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.payment.currency, "RUB");
        assert_eq!(config.payment.webhook_verification, WebhookVerification::Fetch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_port_and_verification_mode() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("COURSE_BILLING__SERVER__PORT", "3000"),
            ("COURSE_BILLING__PAYMENT__WEBHOOK_VERIFICATION", "trust"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.payment.webhook_verification, WebhookVerification::Trust);
    }

    #[test]
    fn production_rejects_short_jwt_secret() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("COURSE_BILLING__SERVER__ENVIRONMENT", "production")]).unwrap();

        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::WeakJwtSecret));
    }

    #[test]
    fn missing_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
