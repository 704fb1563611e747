//! ActivateOrRenewHandler - Command handler run after a payment succeeds.

use std::sync::Arc;

use crate::application::handlers::publish_or_warn;
use crate::domain::billing::BillingError;
use crate::domain::foundation::{CommunityId, TierId, Timestamp, UserId};
use crate::domain::membership::{Membership, MembershipActivation, MembershipEvent};
use crate::ports::{EventPublisher, MembershipRepository};

/// Command to activate a membership or extend an existing one.
#[derive(Debug, Clone)]
pub struct ActivateOrRenewCommand {
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub tier_id: Option<TierId>,
    pub provider_payment_id: Option<String>,
}

/// Handler for paid activations.
///
/// Every activation lasts one calendar month from now, whatever the tier's
/// yearly price.
pub struct ActivateOrRenewHandler {
    memberships: Arc<dyn MembershipRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ActivateOrRenewHandler {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            memberships,
            event_publisher,
        }
    }

    #[tracing::instrument(
        skip_all,
        fields(user_id = %cmd.user_id, community_id = %cmd.community_id)
    )]
    pub async fn handle(&self, cmd: ActivateOrRenewCommand) -> Result<Membership, BillingError> {
        let now = Timestamp::now();
        let activation = MembershipActivation::monthly(
            cmd.user_id,
            cmd.community_id,
            cmd.tier_id,
            cmd.provider_payment_id,
            now,
        );

        let outcome = self.memberships.upsert_activation(&activation).await?;
        let membership = outcome.membership;

        let event = if outcome.inserted {
            tracing::info!(membership_id = %membership.id, "Membership activated");
            MembershipEvent::Activated {
                membership_id: membership.id,
                user_id: membership.user_id.clone(),
                community_id: membership.community_id,
                tier_id: membership.tier_id,
                expires_at: membership.expires_at,
                occurred_at: now,
            }
        } else {
            tracing::info!(membership_id = %membership.id, "Membership renewed");
            MembershipEvent::Renewed {
                membership_id: membership.id,
                user_id: membership.user_id.clone(),
                community_id: membership.community_id,
                tier_id: membership.tier_id,
                expires_at: membership.expires_at,
                occurred_at: now,
            }
        };
        publish_or_warn(self.event_publisher.as_ref(), event.to_envelope()).await;

        Ok(membership)
    }
}
