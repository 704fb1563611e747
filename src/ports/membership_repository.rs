//! Membership repository port.
//!
//! # Design
//!
//! - **One row per (user, community)**: activation is an upsert on that key
//! - **Conditional expiry**: the lazy expiry flip only applies if nobody
//!   renewed the row since it was read

use async_trait::async_trait;

use crate::domain::foundation::{CommunityId, DomainError, MembershipId, Timestamp, UserId};
use crate::domain::membership::{Membership, MembershipActivation};

/// Result of an activation upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// The row as stored after the upsert.
    pub membership: Membership,

    /// `true` when the row did not exist before.
    pub inserted: bool,
}

/// Repository port for Membership persistence.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Atomically create or overwrite the membership for
    /// `(activation.user_id, activation.community_id)`.
    ///
    /// An existing row keeps its id and `created_at`; every period field is
    /// replaced and the status becomes active.
    async fn upsert_activation(
        &self,
        activation: &MembershipActivation,
    ) -> Result<UpsertOutcome, DomainError>;

    async fn find_by_user_and_community(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> Result<Option<Membership>, DomainError>;

    /// Flip an active row to expired, but only if its `expires_at` still
    /// equals `expires_at_read`.
    ///
    /// Returns whether the update applied.
    async fn expire_if_unchanged(
        &self,
        id: &MembershipId,
        expires_at_read: Timestamp,
        now: Timestamp,
    ) -> Result<bool, DomainError>;

    /// All memberships of a user, optionally narrowed to one community.
    /// Newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        community_id: Option<&CommunityId>,
    ) -> Result<Vec<Membership>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn MembershipRepository) {}
    }
}
