//! Transaction aggregate - one attempted payment.
//!
//! A Transaction is written before the gateway is called and then only
//! mutated by webhook processing.
//!
//! # Invariants
//!
//! - `provider_payment_id` is set exactly once, from the first successful
//!   gateway response
//! - `status` only moves forward (see [`TransactionStatus`])
//! - `idempotency_key` is unique per creation attempt

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CommunityId, DomainError, ErrorCode, Money, StateMachine, TierId, Timestamp, TransactionId,
    UserId,
};

use super::{IdempotencyKey, TransactionStatus};

/// Gateway description limit in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 128;

/// Name recorded in `provider` for gateway-backed payments.
pub const YOOKASSA_PROVIDER: &str = "yookassa";

/// Persisted record of a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub tier_id: TierId,
    pub amount: Money,
    pub status: TransactionStatus,
    pub provider: String,
    pub provider_payment_id: Option<String>,
    pub idempotency_key: IdempotencyKey,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Outcome of applying a gateway-reported status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The status moved forward.
    Applied {
        from: TransactionStatus,
        to: TransactionStatus,
    },
    /// The transaction already had this status.
    Unchanged,
}

impl Transaction {
    /// Creates a pending transaction with a fresh idempotency key.
    pub fn create_pending(
        user_id: UserId,
        community_id: CommunityId,
        tier_id: TierId,
        amount: Money,
        description: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        let id = TransactionId::new();
        let idempotency_key = IdempotencyKey::derive(&user_id, &community_id, &tier_id, now, &id);

        Self {
            id,
            user_id,
            community_id,
            tier_id,
            amount,
            status: TransactionStatus::Pending,
            provider: YOOKASSA_PROVIDER.to_string(),
            provider_payment_id: None,
            idempotency_key,
            description: truncate_description(description.into()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Records the gateway's payment id.
    ///
    /// Re-attaching the same id is a no-op; a different id is a conflict.
    pub fn attach_provider_payment_id(
        &mut self,
        provider_payment_id: impl Into<String>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let provider_payment_id = provider_payment_id.into();
        if provider_payment_id.trim().is_empty() {
            return Err(DomainError::validation(
                "provider_payment_id",
                "Gateway returned an empty payment id",
            ));
        }

        match &self.provider_payment_id {
            Some(existing) if *existing == provider_payment_id => Ok(()),
            Some(existing) => Err(DomainError::new(
                ErrorCode::Conflict,
                format!(
                    "Transaction {} already bound to payment {}",
                    self.id, existing
                ),
            )),
            None => {
                self.provider_payment_id = Some(provider_payment_id);
                self.updated_at = now;
                Ok(())
            }
        }
    }

    /// Moves the status forward, rejecting backward or terminal moves.
    pub fn apply_status(
        &mut self,
        target: TransactionStatus,
        now: Timestamp,
    ) -> Result<StatusChange, DomainError> {
        if self.status == target {
            return Ok(StatusChange::Unchanged);
        }

        let from = self.status;
        self.status = from.transition_to(target).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("transaction_id", self.id.to_string())
        })?;
        self.updated_at = now;
        Ok(StatusChange::Applied { from, to: target })
    }
}

fn truncate_description(description: String) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        description
    } else {
        description.chars().take(MAX_DESCRIPTION_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> Transaction {
        Transaction::create_pending(
            UserId::new("user-1").unwrap(),
            CommunityId::new(),
            TierId::new(),
            Money::new(99000, "RUB").unwrap(),
            "Подписка «Pro»",
            Timestamp::now(),
        )
    }

    #[test]
    fn create_pending_starts_without_provider_id() {
        let tx = pending();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.provider, "yookassa");
        assert!(tx.provider_payment_id.is_none());
        assert_eq!(tx.idempotency_key.as_str().len(), 64);
    }

    #[test]
    fn two_pending_transactions_have_distinct_ids_and_keys() {
        let a = pending();
        let b = pending();
        assert_ne!(a.id, b.id);
        assert_ne!(a.idempotency_key, b.idempotency_key);
    }

    #[test]
    fn long_descriptions_are_truncated_by_characters() {
        let tx = Transaction::create_pending(
            UserId::new("user-1").unwrap(),
            CommunityId::new(),
            TierId::new(),
            Money::new(100, "RUB").unwrap(),
            "я".repeat(200),
            Timestamp::now(),
        );
        assert_eq!(tx.description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn provider_payment_id_is_set_once() {
        let mut tx = pending();
        tx.attach_provider_payment_id("pay_1", Timestamp::now()).unwrap();
        tx.attach_provider_payment_id("pay_1", Timestamp::now()).unwrap();

        let err = tx
            .attach_provider_payment_id("pay_2", Timestamp::now())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(tx.provider_payment_id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn empty_provider_payment_id_is_rejected() {
        let mut tx = pending();
        assert!(tx.attach_provider_payment_id("  ", Timestamp::now()).is_err());
    }

    #[test]
    fn apply_status_moves_forward() {
        let mut tx = pending();
        let change = tx
            .apply_status(TransactionStatus::Succeeded, Timestamp::now())
            .unwrap();
        assert_eq!(
            change,
            StatusChange::Applied {
                from: TransactionStatus::Pending,
                to: TransactionStatus::Succeeded
            }
        );
        assert_eq!(tx.status, TransactionStatus::Succeeded);
    }

    #[test]
    fn apply_same_status_is_unchanged() {
        let mut tx = pending();
        tx.apply_status(TransactionStatus::Succeeded, Timestamp::now())
            .unwrap();
        assert_eq!(
            tx.apply_status(TransactionStatus::Succeeded, Timestamp::now())
                .unwrap(),
            StatusChange::Unchanged
        );
    }

    #[test]
    fn apply_status_refuses_to_leave_terminal_state() {
        let mut tx = pending();
        tx.apply_status(TransactionStatus::Canceled, Timestamp::now())
            .unwrap();
        let err = tx
            .apply_status(TransactionStatus::Succeeded, Timestamp::now())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(tx.status, TransactionStatus::Canceled);
    }
}
