//! Access decision for one course and one requester.
//!
//! Pure: everything the decision depends on, including the clock, is passed
//! in. Lazy membership expiry happens before this is called.
//!
//! Order of evaluation:
//! 1. the course owner always gets in
//! 2. a promo code unlocked earlier in the client session gets in, for
//!    courses that have a promo code
//! 3. any satisfied policy gets in (logical OR)
//! 4. otherwise denied

use serde::Serialize;
use std::collections::HashSet;

use crate::domain::foundation::{CourseId, Timestamp};
use crate::domain::membership::Membership;
use crate::domain::tier::TierCatalog;

use super::{AccessPolicy, AccessSubject, AccessTag, Course};

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "tag", rename_all = "snake_case")]
pub enum GrantReason {
    Owner,
    PromoUnlocked,
    Policy(AccessTag),
}

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum AccessDecision {
    Granted(GrantReason),
    Denied,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted(_))
    }
}

/// Compares a promo code with user input, ignoring case and surrounding
/// whitespace. A blank code never matches.
pub fn promo_code_matches(code: &str, input: &str) -> bool {
    let code = code.trim();
    !code.is_empty() && code.to_lowercase() == input.trim().to_lowercase()
}

/// Decides whether `subject` may open `course`.
///
/// `membership` should be the subject's membership in the course's
/// community, already checked for expiry. `catalog` is that community's
/// tier catalog.
pub fn has_access(
    course: &Course,
    subject: &AccessSubject,
    membership: Option<&Membership>,
    catalog: &TierCatalog,
    unlocked_promo_course_ids: &HashSet<CourseId>,
    now: Timestamp,
) -> AccessDecision {
    if course.owner_id == subject.user_id {
        return AccessDecision::Granted(GrantReason::Owner);
    }

    // The unlocked set is client-held; it only counts where a code exists.
    if course.access.has_tag(AccessTag::PromoCode)
        && unlocked_promo_course_ids.contains(&course.id)
    {
        return AccessDecision::Granted(GrantReason::PromoUnlocked);
    }

    // Only a live membership in this course's community counts.
    let membership = membership
        .filter(|m| m.community_id == course.community_id && m.is_active_at(now));

    course
        .access
        .policies()
        .iter()
        .find(|policy| policy_grants(policy, course, subject, membership, catalog, now))
        .map(|policy| AccessDecision::Granted(GrantReason::Policy(policy.tag())))
        .unwrap_or(AccessDecision::Denied)
}

fn policy_grants(
    policy: &AccessPolicy,
    course: &Course,
    subject: &AccessSubject,
    membership: Option<&Membership>,
    catalog: &TierCatalog,
    now: Timestamp,
) -> bool {
    match policy {
        AccessPolicy::Open => true,
        AccessPolicy::PaidSubscription => membership
            .and_then(|m| m.tier_id.as_ref())
            .and_then(|tier_id| catalog.find_active(tier_id))
            .is_some_and(|tier| tier.grants_course(&course.id)),
        AccessPolicy::RatingGate { required } => subject.rating >= *required,
        AccessPolicy::Delayed { days } => {
            membership.is_some_and(|m| m.days_since_start(now) >= i64::from(*days))
        }
        // Handled by the unlocked set above.
        AccessPolicy::PromoCode { .. } => false,
        AccessPolicy::Gifted { emails } => subject
            .normalized_email()
            .is_some_and(|email| emails.iter().any(|gifted| *gifted == email)),
    }
}
