//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::auth::JwtConfig;

const MIN_SECRET_LEN: usize = 32;

/// Settings for validating session tokens issued by the hosted auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret shared with the auth service
    pub jwt_secret: SecretString,

    /// Expected `aud` claim, unchecked when absent
    pub jwt_audience: Option<String>,
}

impl AuthConfig {
    pub fn jwt(&self) -> JwtConfig {
        let config = JwtConfig::new(self.jwt_secret.clone());
        match &self.jwt_audience {
            Some(audience) if !audience.trim().is_empty() => config.with_audience(audience.trim()),
            _ => config,
        }
    }

    /// Short secrets are tolerated in development only.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("auth.jwt_secret"));
        }
        if environment != Environment::Development && secret.len() < MIN_SECRET_LEN {
            return Err(ValidationError::WeakJwtSecret);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::new(secret.to_string()),
            jwt_audience: Some("authenticated".to_string()),
        }
    }

    #[test]
    fn empty_secret_is_missing() {
        assert_eq!(
            config("").validate(Environment::Development),
            Err(ValidationError::MissingRequired("auth.jwt_secret"))
        );
    }

    #[test]
    fn short_secret_allowed_only_in_development() {
        let short = config("dev-secret");
        assert!(short.validate(Environment::Development).is_ok());
        assert_eq!(
            short.validate(Environment::Production),
            Err(ValidationError::WeakJwtSecret)
        );
    }

    #[test]
    fn long_secret_passes_everywhere() {
        let long = config(&"k".repeat(48));
        assert!(long.validate(Environment::Production).is_ok());
    }
}
