//! CheckCourseAccessHandler - Query handler for course access decisions.

use std::collections::HashSet;
use std::sync::Arc;

use crate::application::handlers::membership::{
    GetActiveMembershipHandler, GetActiveMembershipQuery,
};
use crate::domain::access::{has_access, AccessDecision, AccessSubject, AccessTag};
use crate::domain::billing::{BillingError, Resource};
use crate::domain::foundation::{AuthenticatedUser, CourseId, Timestamp};
use crate::domain::tier::TierCatalog;
use crate::ports::{CourseReader, ProfileReader, TierRepository, UserProfile};

#[derive(Debug, Clone)]
pub struct CheckCourseAccessQuery {
    pub user: AuthenticatedUser,
    pub course_id: CourseId,

    /// Courses the client has unlocked with a promo code this session.
    pub unlocked_promo_course_ids: HashSet<CourseId>,
}

/// Gathers what the evaluator needs and asks it.
///
/// The membership and tier catalog are only loaded when a policy on the
/// course reads them.
pub struct CheckCourseAccessHandler {
    courses: Arc<dyn CourseReader>,
    profiles: Arc<dyn ProfileReader>,
    tiers: Arc<dyn TierRepository>,
    active_membership: GetActiveMembershipHandler,
}

impl CheckCourseAccessHandler {
    pub fn new(
        courses: Arc<dyn CourseReader>,
        profiles: Arc<dyn ProfileReader>,
        tiers: Arc<dyn TierRepository>,
        active_membership: GetActiveMembershipHandler,
    ) -> Self {
        Self {
            courses,
            profiles,
            tiers,
            active_membership,
        }
    }

    #[tracing::instrument(skip_all, fields(user_id = %query.user.id, course_id = %query.course_id))]
    pub async fn handle(
        &self,
        query: CheckCourseAccessQuery,
    ) -> Result<AccessDecision, BillingError> {
        let course = self
            .courses
            .find_by_id(&query.course_id)
            .await?
            .ok_or_else(|| BillingError::not_found(Resource::Course, query.course_id))?;

        let user_id = query.user.id;
        let profile = self
            .profiles
            .find_by_user_id(&user_id)
            .await?
            .unwrap_or_else(|| UserProfile::blank(user_id.clone()));
        let subject = AccessSubject::new(
            user_id.clone(),
            profile.email.or(query.user.email),
            profile.rating,
        );

        let config = &course.access;
        let needs_membership =
            config.has_tag(AccessTag::PaidSubscription) || config.has_tag(AccessTag::Delayed);
        let is_owner = course.owner_id == user_id;

        let membership = if needs_membership && !is_owner {
            self.active_membership
                .handle(GetActiveMembershipQuery {
                    user_id,
                    community_id: course.community_id,
                })
                .await?
        } else {
            None
        };

        let catalog = if config.has_tag(AccessTag::PaidSubscription) && membership.is_some() {
            TierCatalog::new(self.tiers.list_for_community(&course.community_id).await?)
        } else {
            TierCatalog::default()
        };

        let decision = has_access(
            &course,
            &subject,
            membership.as_ref(),
            &catalog,
            &query.unlocked_promo_course_ids,
            Timestamp::now(),
        );
        tracing::debug!(?decision, "Course access evaluated");
        Ok(decision)
    }
}
