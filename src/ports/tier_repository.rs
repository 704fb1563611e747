//! Subscription tier lookup.

use async_trait::async_trait;

use crate::domain::foundation::{CommunityId, DomainError, TierId};
use crate::domain::tier::SubscriptionTier;

/// Read access to subscription tiers.
///
/// Tiers are managed by community owners elsewhere; this service never
/// writes them.
#[async_trait]
pub trait TierRepository: Send + Sync {
    /// Find a tier regardless of its active flag.
    async fn find_by_id(&self, id: &TierId) -> Result<Option<SubscriptionTier>, DomainError>;

    /// Every tier of a community, active or not.
    async fn list_for_community(
        &self,
        community_id: &CommunityId,
    ) -> Result<Vec<SubscriptionTier>, DomainError>;
}
