//! Membership aggregate entity.
//!
//! The durable record of a user's standing in one community.
//!
//! # Design Decisions
//!
//! - **One per (user, community)**: unique constraint enforced at database
//!   level; activation is an upsert on that key
//! - **Soft expiry**: rows flip to `expired`, they are never deleted
//! - **Lazy expiry**: nothing sweeps; reads detect and flip

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    CommunityId, DomainError, ErrorCode, MembershipId, StateMachine, TierId, Timestamp, UserId,
    ValidationError,
};

use super::MembershipStatus;

/// How long one activation lasts.
///
/// Paid activations are always monthly, whatever the tier's yearly price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalPeriod {
    Monthly,
    Yearly,
    /// Free opt-in; `expires_at` stays empty.
    NonRenewing,
}

impl RenewalPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenewalPeriod::Monthly => "monthly",
            RenewalPeriod::Yearly => "yearly",
            RenewalPeriod::NonRenewing => "non_renewing",
        }
    }
}

impl fmt::Display for RenewalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenewalPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(RenewalPeriod::Monthly),
            "yearly" => Ok(RenewalPeriod::Yearly),
            "non_renewing" => Ok(RenewalPeriod::NonRenewing),
            other => Err(ValidationError::invalid_format(
                "renewal_period",
                format!("unknown renewal period '{}'", other),
            )),
        }
    }
}

/// Membership aggregate.
///
/// # Invariants
///
/// - at most one per `(user_id, community_id)`
/// - `expires_at`, when set, is not before `started_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub community_id: CommunityId,

    /// Current paid tier. `None` means no paid tier.
    pub tier_id: Option<TierId>,

    pub status: MembershipStatus,
    pub started_at: Timestamp,

    /// `None` means the membership never expires.
    pub expires_at: Option<Timestamp>,

    pub renewal_period: RenewalPeriod,

    /// Last gateway payment id that (re)activated this membership.
    pub external_subscription_id: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Membership {
    /// True when `expires_at` is set and strictly before `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at.is_before(&now))
    }

    /// True when the status is active and the period has not run out.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.status == MembershipStatus::Active && !self.is_expired_at(now)
    }

    /// Whole days since the current period started.
    pub fn days_since_start(&self, now: Timestamp) -> i64 {
        now.whole_days_since(&self.started_at)
    }

    /// Flips status to expired.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(MembershipStatus::Expired)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        self.updated_at = now;
        Ok(())
    }

    /// Overwrites the period with a new activation.
    ///
    /// Used by stores that upsert in memory; Postgres does the same in SQL.
    pub fn apply_activation(&mut self, activation: &MembershipActivation) {
        self.tier_id = activation.tier_id;
        self.status = MembershipStatus::Active;
        self.started_at = activation.started_at;
        self.expires_at = activation.expires_at;
        self.renewal_period = activation.renewal_period;
        self.external_subscription_id = activation.external_subscription_id.clone();
        self.updated_at = activation.started_at;
    }
}

/// Everything an activation or renewal writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipActivation {
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub tier_id: Option<TierId>,
    pub started_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub renewal_period: RenewalPeriod,
    pub external_subscription_id: Option<String>,
}

impl MembershipActivation {
    /// A paid activation: one calendar month from `now`.
    pub fn monthly(
        user_id: UserId,
        community_id: CommunityId,
        tier_id: Option<TierId>,
        provider_payment_id: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            user_id,
            community_id,
            tier_id,
            started_at: now,
            expires_at: Some(now.add_months(1)),
            renewal_period: RenewalPeriod::Monthly,
            external_subscription_id: provider_payment_id,
        }
    }

    /// A free-tier opt-in that never expires.
    pub fn free(
        user_id: UserId,
        community_id: CommunityId,
        tier_id: TierId,
        now: Timestamp,
    ) -> Self {
        Self {
            user_id,
            community_id,
            tier_id: Some(tier_id),
            started_at: now,
            expires_at: None,
            renewal_period: RenewalPeriod::NonRenewing,
            external_subscription_id: None,
        }
    }

    /// Materialises a brand-new row.
    pub fn into_membership(self, id: MembershipId) -> Membership {
        Membership {
            id,
            user_id: self.user_id,
            community_id: self.community_id,
            tier_id: self.tier_id,
            status: MembershipStatus::Active,
            started_at: self.started_at,
            expires_at: self.expires_at,
            renewal_period: self.renewal_period,
            external_subscription_id: self.external_subscription_id,
            created_at: self.started_at,
            updated_at: self.started_at,
        }
    }
}
