//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.
//!
//! - `payment` - Subscription checkout and gateway webhooks
//! - `membership` - Activation, renewal, lazy expiry and listing
//! - `access` - Course access checks, promo unlock and tier listing

pub mod access;
pub mod membership;
pub mod payment;

use crate::domain::foundation::EventEnvelope;
use crate::ports::EventPublisher;

/// Publishes an event after its state change has been stored.
///
/// The change is already committed, so a failure is only logged.
pub(crate) async fn publish_or_warn(publisher: &dyn EventPublisher, envelope: EventEnvelope) {
    let event_type = envelope.event_type.clone();
    let aggregate_id = envelope.aggregate_id.clone();

    if let Err(e) = publisher.publish(envelope).await {
        tracing::warn!(
            event_type = %event_type,
            aggregate_id = %aggregate_id,
            error = %e,
            "Failed to publish event"
        );
    }
}
