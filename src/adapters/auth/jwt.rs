//! Shared-secret JWT adapter.
//!
//! The hosted auth service signs access tokens with HS256 and a project
//! secret. This adapter implements the `SessionValidator` port by:
//!
//! 1. Verifying the HS256 signature against the shared secret
//! 2. Validating expiry and, when configured, audience
//! 3. Mapping `sub` and `email` to the domain `AuthenticatedUser`
//!
//! # Example
//!
//! ```ignore
//! let config = JwtConfig::new(secret).with_audience("authenticated");
//! let validator = JwtSessionValidator::new(config);
//! let user = validator.validate("eyJ...").await?;
//! ```

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Configuration for the JWT adapter.
#[derive(Clone)]
pub struct JwtConfig {
    secret: SecretString,

    /// Expected `aud` claim. Not checked when `None`.
    audience: Option<String>,
}

impl JwtConfig {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            audience: None,
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

/// Claims this service reads.
#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    exp: i64,

    #[serde(default)]
    email: Option<String>,
}

/// HS256 session validator.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    audience: Option<String>,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
            audience: config.audience,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidAudience => {
                    tracing::warn!("Invalid audience in token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            })?;
        let claims = data.claims;

        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Token has an empty subject");
            AuthError::InvalidToken
        })?;

        let email = claims
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        Ok(AuthenticatedUser::new(user_id, email))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn validator() -> JwtSessionValidator {
        JwtSessionValidator::new(JwtConfig::new(SecretString::new(SECRET.to_string())))
    }

    #[tokio::test]
    async fn valid_token_yields_user_and_email() {
        let jwt = token(
            json!({
                "sub": "user-1",
                "email": "Student@Example.com",
                "exp": in_one_hour(),
                "aud": "authenticated"
            }),
            SECRET,
        );

        let user = validator().validate(&jwt).await.unwrap();
        assert_eq!(user.id.as_str(), "user-1");
        assert_eq!(user.email.as_deref(), Some("Student@Example.com"));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let jwt = token(json!({"sub": "user-1", "exp": in_one_hour()}), "another-secret");
        assert_eq!(validator().validate(&jwt).await.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let jwt = token(
            json!({"sub": "user-1", "exp": chrono::Utc::now().timestamp() - 3600}),
            SECRET,
        );
        assert_eq!(validator().validate(&jwt).await.unwrap_err(), AuthError::TokenExpired);
    }

    #[tokio::test]
    async fn audience_is_checked_when_configured() {
        let validator = JwtSessionValidator::new(
            JwtConfig::new(SecretString::new(SECRET.to_string())).with_audience("authenticated"),
        );

        let good = token(json!({"sub": "u", "exp": in_one_hour(), "aud": "authenticated"}), SECRET);
        let bad = token(json!({"sub": "u", "exp": in_one_hour(), "aud": "anon"}), SECRET);

        assert!(validator.validate(&good).await.is_ok());
        assert_eq!(validator.validate(&bad).await.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        assert_eq!(
            validator().validate("not-a-jwt").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn validator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JwtSessionValidator>();
    }
}
