//! Membership domain events.
//!
//! Emitted after a membership change has been committed. They feed the
//! optional change feed consumed by notification collaborators.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CommunityId, EventEnvelope, MembershipId, TierId, Timestamp, UserId,
};

/// Events in a membership's life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MembershipEvent {
    /// First activation for this (user, community).
    Activated {
        membership_id: MembershipId,
        user_id: UserId,
        community_id: CommunityId,
        tier_id: Option<TierId>,
        expires_at: Option<Timestamp>,
        occurred_at: Timestamp,
    },

    /// An existing row was reactivated or extended.
    Renewed {
        membership_id: MembershipId,
        user_id: UserId,
        community_id: CommunityId,
        tier_id: Option<TierId>,
        expires_at: Option<Timestamp>,
        occurred_at: Timestamp,
    },

    /// Lazy expiry flipped the row.
    Expired {
        membership_id: MembershipId,
        user_id: UserId,
        community_id: CommunityId,
        occurred_at: Timestamp,
    },
}

impl MembershipEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            MembershipEvent::Activated { .. } => "membership.activated.v1",
            MembershipEvent::Renewed { .. } => "membership.renewed.v1",
            MembershipEvent::Expired { .. } => "membership.expired.v1",
        }
    }

    pub fn membership_id(&self) -> &MembershipId {
        match self {
            MembershipEvent::Activated { membership_id, .. }
            | MembershipEvent::Renewed { membership_id, .. }
            | MembershipEvent::Expired { membership_id, .. } => membership_id,
        }
    }

    pub fn user_id(&self) -> &UserId {
        match self {
            MembershipEvent::Activated { user_id, .. }
            | MembershipEvent::Renewed { user_id, .. }
            | MembershipEvent::Expired { user_id, .. } => user_id,
        }
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            MembershipEvent::Activated { occurred_at, .. }
            | MembershipEvent::Renewed { occurred_at, .. }
            | MembershipEvent::Expired { occurred_at, .. } => *occurred_at,
        }
    }

    pub fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::new(
            self.event_type(),
            self.membership_id().to_string(),
            "Membership",
            serde_json::to_value(self).unwrap_or_default(),
        )
        .with_occurred_at(self.occurred_at())
        .with_user_id(self.user_id().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_versioned() {
        let event = MembershipEvent::Expired {
            membership_id: MembershipId::new(),
            user_id: UserId::new("user-1").unwrap(),
            community_id: CommunityId::new(),
            occurred_at: Timestamp::now(),
        };
        assert_eq!(event.event_type(), "membership.expired.v1");
        assert_eq!(event.to_envelope().schema_version, 1);
    }

    #[test]
    fn envelope_payload_is_tagged() {
        let id = MembershipId::new();
        let event = MembershipEvent::Renewed {
            membership_id: id,
            user_id: UserId::new("user-1").unwrap(),
            community_id: CommunityId::new(),
            tier_id: None,
            expires_at: None,
            occurred_at: Timestamp::now(),
        };
        let env = event.to_envelope();
        assert_eq!(env.aggregate_id, id.to_string());
        assert_eq!(env.payload["type"], "renewed");
    }
}
