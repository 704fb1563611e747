//! JoinFreeTierHandler - Command handler for free-tier opt-in.

use std::sync::Arc;

use crate::application::handlers::publish_or_warn;
use crate::domain::billing::{BillingError, Resource};
use crate::domain::foundation::{CommunityId, TierId, Timestamp, UserId};
use crate::domain::membership::{Membership, MembershipActivation, MembershipEvent};
use crate::ports::{CommunityReader, EventPublisher, MembershipRepository, TierRepository};

#[derive(Debug, Clone)]
pub struct JoinFreeTierCommand {
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub tier_id: TierId,
}

/// Creates a non-expiring membership on a free tier.
///
/// Joining the tier one already holds returns the existing membership. A
/// live paid membership is never downgraded.
pub struct JoinFreeTierHandler {
    tiers: Arc<dyn TierRepository>,
    communities: Arc<dyn CommunityReader>,
    memberships: Arc<dyn MembershipRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl JoinFreeTierHandler {
    pub fn new(
        tiers: Arc<dyn TierRepository>,
        communities: Arc<dyn CommunityReader>,
        memberships: Arc<dyn MembershipRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            tiers,
            communities,
            memberships,
            event_publisher,
        }
    }

    #[tracing::instrument(skip_all, fields(user_id = %cmd.user_id, tier_id = %cmd.tier_id))]
    pub async fn handle(&self, cmd: JoinFreeTierCommand) -> Result<Membership, BillingError> {
        let tier = self
            .tiers
            .find_by_id(&cmd.tier_id)
            .await?
            .filter(|t| t.community_id == cmd.community_id)
            .ok_or_else(|| BillingError::not_found(Resource::Tier, cmd.tier_id))?;

        if self.communities.find_by_id(&cmd.community_id).await?.is_none() {
            return Err(BillingError::not_found(Resource::Community, cmd.community_id));
        }

        if !tier.is_active {
            return Err(BillingError::invalid_state("Subscription tier is not active"));
        }
        if !tier.is_free {
            return Err(BillingError::invalid_state(
                "Subscription tier requires payment",
            ));
        }

        let now = Timestamp::now();
        let existing = self
            .memberships
            .find_by_user_and_community(&cmd.user_id, &cmd.community_id)
            .await?
            .filter(|m| m.is_active_at(now));

        if let Some(current) = existing {
            if current.tier_id == Some(tier.id) {
                return Ok(current);
            }
            return Err(BillingError::invalid_state(
                "User already has an active membership in this community",
            ));
        }

        let activation =
            MembershipActivation::free(cmd.user_id, cmd.community_id, tier.id, now);
        let outcome = self.memberships.upsert_activation(&activation).await?;
        let membership = outcome.membership;

        let event = if outcome.inserted {
            MembershipEvent::Activated {
                membership_id: membership.id,
                user_id: membership.user_id.clone(),
                community_id: membership.community_id,
                tier_id: membership.tier_id,
                expires_at: None,
                occurred_at: now,
            }
        } else {
            MembershipEvent::Renewed {
                membership_id: membership.id,
                user_id: membership.user_id.clone(),
                community_id: membership.community_id,
                tier_id: membership.tier_id,
                expires_at: None,
                occurred_at: now,
            }
        };
        tracing::info!(membership_id = %membership.id, "Joined free tier");
        publish_or_warn(self.event_publisher.as_ref(), event.to_envelope()).await;

        Ok(membership)
    }
}
