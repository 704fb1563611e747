//! ListMembershipsHandler - Query handler for a user's memberships.

use std::sync::Arc;

use crate::domain::billing::BillingError;
use crate::domain::foundation::{CommunityId, Timestamp, UserId};
use crate::domain::membership::MembershipView;
use crate::ports::MembershipRepository;

#[derive(Debug, Clone)]
pub struct ListMembershipsQuery {
    pub user_id: UserId,
    pub community_id: Option<CommunityId>,
}

/// Lists memberships with `is_expired`/`is_active` computed now.
///
/// Listing is a pure read; it never flips a row to expired.
pub struct ListMembershipsHandler {
    memberships: Arc<dyn MembershipRepository>,
}

impl ListMembershipsHandler {
    pub fn new(memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { memberships }
    }

    pub async fn handle(
        &self,
        query: ListMembershipsQuery,
    ) -> Result<Vec<MembershipView>, BillingError> {
        let now = Timestamp::now();
        let memberships = self
            .memberships
            .list_for_user(&query.user_id, query.community_id.as_ref())
            .await?;

        Ok(memberships
            .into_iter()
            .map(|m| MembershipView::at(m, now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMembershipRepository;
    use crate::domain::foundation::{MembershipId, TierId};
    use crate::domain::membership::{MembershipActivation, MembershipStatus};

    #[tokio::test]
    async fn lapsed_rows_are_flagged_but_not_flipped() {
        let repo = Arc::new(InMemoryMembershipRepository::new());
        let community = CommunityId::new();
        let user = UserId::new("u").unwrap();
        repo.put(
            MembershipActivation::monthly(
                user.clone(),
                community,
                Some(TierId::new()),
                None,
                Timestamp::now().add_days(-60),
            )
            .into_membership(MembershipId::new()),
        )
        .await;

        let handler = ListMembershipsHandler::new(repo);
        let views = handler
            .handle(ListMembershipsQuery {
                user_id: user,
                community_id: Some(community),
            })
            .await
            .unwrap();

        assert_eq!(views.len(), 1);
        assert!(views[0].is_expired);
        assert!(!views[0].is_active);
        assert_eq!(views[0].membership.status, MembershipStatus::Active);
    }

    #[tokio::test]
    async fn empty_for_unknown_user() {
        let handler = ListMembershipsHandler::new(Arc::new(InMemoryMembershipRepository::new()));
        let views = handler
            .handle(ListMembershipsQuery {
                user_id: UserId::new("nobody").unwrap(),
                community_id: None,
            })
            .await
            .unwrap();
        assert!(views.is_empty());
    }
}
