//! Client-facing membership projection with derived flags.

use serde::Serialize;

use crate::domain::foundation::Timestamp;

use super::Membership;

/// A membership plus `is_expired`/`is_active` computed at read time.
///
/// The flags are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipView {
    pub membership: Membership,
    pub is_expired: bool,
    pub is_active: bool,
}

impl MembershipView {
    pub fn at(membership: Membership, now: Timestamp) -> Self {
        let is_expired = membership.is_expired_at(now);
        let is_active = membership.is_active_at(now);
        Self {
            membership,
            is_expired,
            is_active,
        }
    }
}
