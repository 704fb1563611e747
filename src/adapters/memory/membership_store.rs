//! In-memory membership repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{CommunityId, DomainError, MembershipId, Timestamp, UserId};
use crate::domain::membership::{Membership, MembershipActivation, MembershipStatus};
use crate::ports::{MembershipRepository, UpsertOutcome};

/// Memberships keyed by id. The write lock makes each upsert and each
/// conditional expiry atomic.
#[derive(Default)]
pub struct InMemoryMembershipRepository {
    rows: RwLock<HashMap<MembershipId, Membership>>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a membership as-is. For seeding fixtures.
    pub async fn put(&self, membership: Membership) {
        self.rows.write().await.insert(membership.id, membership);
    }

    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn upsert_activation(
        &self,
        activation: &MembershipActivation,
    ) -> Result<UpsertOutcome, DomainError> {
        let mut rows = self.rows.write().await;

        let existing = rows.values_mut().find(|m| {
            m.user_id == activation.user_id && m.community_id == activation.community_id
        });

        if let Some(membership) = existing {
            membership.apply_activation(activation);
            return Ok(UpsertOutcome {
                membership: membership.clone(),
                inserted: false,
            });
        }

        let membership = activation.clone().into_membership(MembershipId::new());
        rows.insert(membership.id, membership.clone());
        Ok(UpsertOutcome {
            membership,
            inserted: true,
        })
    }

    async fn find_by_user_and_community(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> Result<Option<Membership>, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|m| m.user_id == *user_id && m.community_id == *community_id)
            .cloned())
    }

    async fn expire_if_unchanged(
        &self,
        id: &MembershipId,
        expires_at_read: Timestamp,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut rows = self.rows.write().await;
        let Some(membership) = rows.get_mut(id) else {
            return Ok(false);
        };

        if membership.status != MembershipStatus::Active
            || membership.expires_at != Some(expires_at_read)
        {
            return Ok(false);
        }

        membership.status = MembershipStatus::Expired;
        membership.updated_at = now;
        Ok(true)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        community_id: Option<&CommunityId>,
    ) -> Result<Vec<Membership>, DomainError> {
        let mut memberships: Vec<Membership> = self
            .rows
            .read()
            .await
            .values()
            .filter(|m| m.user_id == *user_id)
            .filter(|m| community_id.map_or(true, |c| m.community_id == *c))
            .cloned()
            .collect();
        memberships.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(memberships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TierId;

    fn activation(user: &str, community: CommunityId, now: Timestamp) -> MembershipActivation {
        MembershipActivation::monthly(
            UserId::new(user).unwrap(),
            community,
            Some(TierId::new()),
            Some("pay_1".to_string()),
            now,
        )
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_user_and_community() {
        let repo = InMemoryMembershipRepository::new();
        let community = CommunityId::new();
        let now = Timestamp::now();

        let first = repo
            .upsert_activation(&activation("u", community, now))
            .await
            .unwrap();
        let second = repo
            .upsert_activation(&activation("u", community, now.add_days(3)))
            .await
            .unwrap();

        assert!(first.inserted);
        assert!(!second.inserted);
        assert_eq!(first.membership.id, second.membership.id);
        assert_eq!(second.membership.started_at, now.add_days(3));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn expiry_is_skipped_when_row_was_renewed() {
        let repo = InMemoryMembershipRepository::new();
        let community = CommunityId::new();
        let start = Timestamp::now().add_days(-40);

        let stale = repo
            .upsert_activation(&activation("u", community, start))
            .await
            .unwrap()
            .membership;
        repo.upsert_activation(&activation("u", community, Timestamp::now()))
            .await
            .unwrap();

        let applied = repo
            .expire_if_unchanged(&stale.id, stale.expires_at.unwrap(), Timestamp::now())
            .await
            .unwrap();
        assert!(!applied);

        let current = repo
            .find_by_user_and_community(&stale.user_id, &community)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, MembershipStatus::Active);
    }

    #[tokio::test]
    async fn expiry_applies_once() {
        let repo = InMemoryMembershipRepository::new();
        let m = repo
            .upsert_activation(&activation("u", CommunityId::new(), Timestamp::now().add_days(-40)))
            .await
            .unwrap()
            .membership;
        let read = m.expires_at.unwrap();

        assert!(repo.expire_if_unchanged(&m.id, read, Timestamp::now()).await.unwrap());
        assert!(!repo.expire_if_unchanged(&m.id, read, Timestamp::now()).await.unwrap());
    }

    #[tokio::test]
    async fn list_filters_by_community() {
        let repo = InMemoryMembershipRepository::new();
        let a = CommunityId::new();
        let b = CommunityId::new();
        repo.upsert_activation(&activation("u", a, Timestamp::now())).await.unwrap();
        repo.upsert_activation(&activation("u", b, Timestamp::now())).await.unwrap();
        repo.upsert_activation(&activation("other", a, Timestamp::now())).await.unwrap();

        let user = UserId::new("u").unwrap();
        assert_eq!(repo.list_for_user(&user, None).await.unwrap().len(), 2);
        assert_eq!(repo.list_for_user(&user, Some(&a)).await.unwrap().len(), 1);
    }
}
