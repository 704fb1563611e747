//! Event publisher that writes envelopes to the structured log.
//!
//! The change feed has no broker in this deployment; downstream
//! collaborators tail the JSON logs instead.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventPublisher;

impl LogEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&event.payload)
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;

        tracing::info!(
            target: "course_billing::events",
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            occurred_at = %event.occurred_at,
            payload = %payload,
            "domain event"
        );
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn publishing_never_fails_for_json_payloads() {
        let publisher = LogEventPublisher::new();
        let event =
            EventEnvelope::new("payment.canceled.v1", "t-1", "Transaction", json!({"a": 1}));

        assert!(publisher.publish(event.clone()).await.is_ok());
        assert!(publisher.publish_all(vec![event]).await.is_ok());
    }
}
