//! Idempotency key passed to the payment gateway.
//!
//! The gateway deduplicates create-payment calls carrying the same key within
//! its retention window. A key is derived from who is buying what and when,
//! salted with the new transaction id so that two creation attempts never
//! share a key, even within the same clock tick.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::foundation::{
    CommunityId, TierId, Timestamp, TransactionId, UserId, ValidationError,
};

/// Gateway limit on the `Idempotence-Key` header.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 64;

/// Hex-encoded SHA-256 digest identifying one creation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Derives the key for a new transaction.
    pub fn derive(
        user_id: &UserId,
        community_id: &CommunityId,
        tier_id: &TierId,
        at: Timestamp,
        transaction_id: &TransactionId,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(community_id.as_uuid().as_bytes());
        hasher.update(b"|");
        hasher.update(tier_id.as_uuid().as_bytes());
        hasher.update(b"|");
        hasher.update(at.as_unix_micros().to_be_bytes());
        hasher.update(b"|");
        hasher.update(transaction_id.as_uuid().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Rehydrates a key read from storage.
    pub fn from_stored(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::empty_field("idempotency_key"));
        }
        if value.len() > MAX_IDEMPOTENCY_KEY_LEN {
            return Err(ValidationError::out_of_range(
                "idempotency_key",
                1,
                MAX_IDEMPOTENCY_KEY_LEN as i64,
                value.len() as i64,
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> (UserId, CommunityId, TierId) {
        (UserId::new("user-1").unwrap(), CommunityId::new(), TierId::new())
    }

    #[test]
    fn key_fits_gateway_header_limit() {
        let (user, community, tier) = parts();
        let key = IdempotencyKey::derive(
            &user,
            &community,
            &tier,
            Timestamp::now(),
            &TransactionId::new(),
        );
        assert_eq!(key.as_str().len(), MAX_IDEMPOTENCY_KEY_LEN);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_inputs_give_same_key() {
        let (user, community, tier) = parts();
        let at = Timestamp::now();
        let tx = TransactionId::new();
        assert_eq!(
            IdempotencyKey::derive(&user, &community, &tier, at, &tx),
            IdempotencyKey::derive(&user, &community, &tier, at, &tx)
        );
    }

    #[test]
    fn same_instant_different_attempts_differ() {
        let (user, community, tier) = parts();
        let at = Timestamp::now();
        let first = IdempotencyKey::derive(&user, &community, &tier, at, &TransactionId::new());
        let second = IdempotencyKey::derive(&user, &community, &tier, at, &TransactionId::new());
        assert_ne!(first, second);
    }

    #[test]
    fn timestamp_changes_key() {
        let (user, community, tier) = parts();
        let tx = TransactionId::new();
        let at = Timestamp::now();
        assert_ne!(
            IdempotencyKey::derive(&user, &community, &tier, at, &tx),
            IdempotencyKey::derive(&user, &community, &tier, at.plus_secs(1), &tx)
        );
    }

    #[test]
    fn from_stored_validates_length() {
        assert!(IdempotencyKey::from_stored("").is_err());
        assert!(IdempotencyKey::from_stored("a".repeat(65)).is_err());
        assert!(IdempotencyKey::from_stored("abc").is_ok());
    }
}
