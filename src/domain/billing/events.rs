//! Payment domain events.
//!
//! Raised by the payment handlers after the corresponding change has been
//! committed. Consumers treat them as notifications, not commands.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CommunityId, EventEnvelope, TierId, Timestamp, TransactionId, UserId,
};

/// Events in a transaction's life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentEvent {
    /// A pending transaction was written and handed to the gateway.
    TransactionCreated {
        transaction_id: TransactionId,
        user_id: UserId,
        community_id: CommunityId,
        tier_id: TierId,
        amount_minor: i64,
        currency: String,
        occurred_at: Timestamp,
    },

    /// The gateway settled the payment.
    Succeeded {
        transaction_id: TransactionId,
        provider_payment_id: String,
        user_id: UserId,
        community_id: CommunityId,
        occurred_at: Timestamp,
    },

    /// The gateway canceled the payment.
    Canceled {
        transaction_id: TransactionId,
        provider_payment_id: String,
        user_id: UserId,
        occurred_at: Timestamp,
    },
}

impl PaymentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::TransactionCreated { .. } => "payment.transaction_created.v1",
            PaymentEvent::Succeeded { .. } => "payment.succeeded.v1",
            PaymentEvent::Canceled { .. } => "payment.canceled.v1",
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        match self {
            PaymentEvent::TransactionCreated { transaction_id, .. }
            | PaymentEvent::Succeeded { transaction_id, .. }
            | PaymentEvent::Canceled { transaction_id, .. } => transaction_id,
        }
    }

    fn user_id(&self) -> &UserId {
        match self {
            PaymentEvent::TransactionCreated { user_id, .. }
            | PaymentEvent::Succeeded { user_id, .. }
            | PaymentEvent::Canceled { user_id, .. } => user_id,
        }
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            PaymentEvent::TransactionCreated { occurred_at, .. }
            | PaymentEvent::Succeeded { occurred_at, .. }
            | PaymentEvent::Canceled { occurred_at, .. } => *occurred_at,
        }
    }

    /// Wraps the event for the publisher.
    pub fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::new(
            self.event_type(),
            self.transaction_id().to_string(),
            "Transaction",
            serde_json::to_value(self).unwrap_or_default(),
        )
        .with_occurred_at(self.occurred_at())
        .with_user_id(self.user_id().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_type_and_aggregate() {
        let tx_id = TransactionId::new();
        let event = PaymentEvent::Succeeded {
            transaction_id: tx_id,
            provider_payment_id: "pay_1".to_string(),
            user_id: UserId::new("user-1").unwrap(),
            community_id: CommunityId::new(),
            occurred_at: Timestamp::now(),
        };

        let env = event.to_envelope();
        assert_eq!(env.event_type, "payment.succeeded.v1");
        assert_eq!(env.aggregate_type, "Transaction");
        assert_eq!(env.aggregate_id, tx_id.to_string());
        assert_eq!(env.metadata.user_id.as_deref(), Some("user-1"));
        assert_eq!(env.payload["type"], "succeeded");
        assert_eq!(env.payload["provider_payment_id"], "pay_1");
    }

    #[test]
    fn created_event_type() {
        let event = PaymentEvent::TransactionCreated {
            transaction_id: TransactionId::new(),
            user_id: UserId::new("u").unwrap(),
            community_id: CommunityId::new(),
            tier_id: TierId::new(),
            amount_minor: 99000,
            currency: "RUB".to_string(),
            occurred_at: Timestamp::now(),
        };
        assert_eq!(event.event_type(), "payment.transaction_created.v1");
    }
}
