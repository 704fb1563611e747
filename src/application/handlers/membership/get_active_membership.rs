//! GetActiveMembershipHandler - Query handler with lazy expiry.
//!
//! Nothing sweeps expired memberships. The first read that finds a lapsed
//! active row flips it to `expired`, guarded by the `expires_at` it read so
//! a renewal that landed in between is never overwritten.

use std::sync::Arc;

use crate::application::handlers::publish_or_warn;
use crate::domain::billing::BillingError;
use crate::domain::foundation::{CommunityId, Timestamp, UserId};
use crate::domain::membership::{Membership, MembershipEvent, MembershipStatus};
use crate::ports::{EventPublisher, MembershipRepository};

/// Query for the live membership of a user in a community.
#[derive(Debug, Clone)]
pub struct GetActiveMembershipQuery {
    pub user_id: UserId,
    pub community_id: CommunityId,
}

pub struct GetActiveMembershipHandler {
    memberships: Arc<dyn MembershipRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl GetActiveMembershipHandler {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            memberships,
            event_publisher,
        }
    }

    /// Returns the membership only while it is active and unexpired.
    pub async fn handle(
        &self,
        query: GetActiveMembershipQuery,
    ) -> Result<Option<Membership>, BillingError> {
        let now = Timestamp::now();
        let Some(membership) = self
            .memberships
            .find_by_user_and_community(&query.user_id, &query.community_id)
            .await?
        else {
            return Ok(None);
        };

        if membership.status != MembershipStatus::Active {
            return Ok(None);
        }

        let Some(expires_at) = membership.expires_at else {
            return Ok(Some(membership));
        };
        if !membership.is_expired_at(now) {
            return Ok(Some(membership));
        }

        let flipped = self
            .memberships
            .expire_if_unchanged(&membership.id, expires_at, now)
            .await?;

        if flipped {
            tracing::info!(
                membership_id = %membership.id,
                expires_at = %expires_at,
                "Membership expired"
            );
            let event = MembershipEvent::Expired {
                membership_id: membership.id,
                user_id: membership.user_id.clone(),
                community_id: membership.community_id,
                occurred_at: now,
            };
            publish_or_warn(self.event_publisher.as_ref(), event.to_envelope()).await;
            return Ok(None);
        }

        // Someone else changed the row after we read it; trust the fresh copy.
        let fresh = self
            .memberships
            .find_by_user_and_community(&query.user_id, &query.community_id)
            .await?;
        Ok(fresh.filter(|m| m.is_active_at(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemoryMembershipRepository;
    use crate::domain::foundation::{DomainError, MembershipId, TierId};
    use crate::domain::membership::MembershipActivation;
    use crate::ports::UpsertOutcome;
    use async_trait::async_trait;

    fn membership(community: CommunityId, started_days_ago: i64) -> Membership {
        MembershipActivation::monthly(
            UserId::new("u").unwrap(),
            community,
            Some(TierId::new()),
            Some("pay_1".to_string()),
            Timestamp::now().add_days(-started_days_ago),
        )
        .into_membership(MembershipId::new())
    }

    fn query(community: CommunityId) -> GetActiveMembershipQuery {
        GetActiveMembershipQuery {
            user_id: UserId::new("u").unwrap(),
            community_id: community,
        }
    }

    async fn setup(
        seed: Option<Membership>,
    ) -> (
        GetActiveMembershipHandler,
        Arc<InMemoryMembershipRepository>,
        Arc<InMemoryEventBus>,
    ) {
        let repo = Arc::new(InMemoryMembershipRepository::new());
        if let Some(m) = seed {
            repo.put(m).await;
        }
        let bus = Arc::new(InMemoryEventBus::new());
        (
            GetActiveMembershipHandler::new(repo.clone(), bus.clone()),
            repo,
            bus,
        )
    }

    #[tokio::test]
    async fn missing_membership_is_none() {
        let (handler, _, _) = setup(None).await;
        assert!(handler.handle(query(CommunityId::new())).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn live_membership_is_returned_untouched() {
        let community = CommunityId::new();
        let (handler, _, bus) = setup(Some(membership(community, 3))).await;

        let found = handler.handle(query(community)).await.unwrap().unwrap();

        assert_eq!(found.status, MembershipStatus::Active);
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn lapsed_membership_is_flipped_and_hidden() {
        let community = CommunityId::new();
        let (handler, repo, bus) = setup(Some(membership(community, 45))).await;

        assert!(handler.handle(query(community)).await.unwrap().is_none());

        let stored = repo
            .find_by_user_and_community(&UserId::new("u").unwrap(), &community)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, MembershipStatus::Expired);
        assert_eq!(bus.events_of_type("membership.expired.v1").len(), 1);

        // Second read sees an expired row and emits nothing new.
        assert!(handler.handle(query(community)).await.unwrap().is_none());
        assert_eq!(bus.events_of_type("membership.expired.v1").len(), 1);
    }

    #[tokio::test]
    async fn non_expiring_membership_is_live() {
        let community = CommunityId::new();
        let free = MembershipActivation::free(
            UserId::new("u").unwrap(),
            community,
            TierId::new(),
            Timestamp::now().add_days(-900),
        )
        .into_membership(MembershipId::new());
        let (handler, _, _) = setup(Some(free)).await;

        assert!(handler.handle(query(community)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn canceled_membership_is_none() {
        let community = CommunityId::new();
        let mut m = membership(community, 1);
        m.status = MembershipStatus::Canceled;
        let (handler, _, _) = setup(Some(m)).await;

        assert!(handler.handle(query(community)).await.unwrap().is_none());
    }

    /// Serves a stale read, then behaves as if a renewal raced in.
    struct RenewedBetweenReads {
        stale: Membership,
        fresh: Membership,
        reads: std::sync::Mutex<u32>,
    }

    #[async_trait]
    impl MembershipRepository for RenewedBetweenReads {
        async fn upsert_activation(
            &self,
            _activation: &MembershipActivation,
        ) -> Result<UpsertOutcome, DomainError> {
            unreachable!()
        }

        async fn find_by_user_and_community(
            &self,
            _user_id: &UserId,
            _community_id: &CommunityId,
        ) -> Result<Option<Membership>, DomainError> {
            let mut reads = self.reads.lock().unwrap();
            *reads += 1;
            Ok(Some(if *reads == 1 {
                self.stale.clone()
            } else {
                self.fresh.clone()
            }))
        }

        async fn expire_if_unchanged(
            &self,
            _id: &MembershipId,
            _expires_at_read: Timestamp,
            _now: Timestamp,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn list_for_user(
            &self,
            _user_id: &UserId,
            _community_id: Option<&CommunityId>,
        ) -> Result<Vec<Membership>, DomainError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn lost_expiry_race_returns_renewed_row() {
        let community = CommunityId::new();
        let stale = membership(community, 45);
        let mut fresh = membership(community, 0);
        fresh.id = stale.id;

        let bus = Arc::new(InMemoryEventBus::new());
        let handler = GetActiveMembershipHandler::new(
            Arc::new(RenewedBetweenReads {
                stale,
                fresh: fresh.clone(),
                reads: std::sync::Mutex::new(0),
            }),
            bus.clone(),
        );

        let found = handler.handle(query(community)).await.unwrap();

        assert_eq!(found, Some(fresh));
        assert_eq!(bus.event_count(), 0);
    }
}
