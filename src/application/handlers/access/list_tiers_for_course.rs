//! ListTiersForCourseHandler - Query handler for "which plan unlocks this".

use std::sync::Arc;

use crate::domain::billing::{BillingError, Resource};
use crate::domain::foundation::CourseId;
use crate::domain::tier::{CheckoutRoute, SubscriptionTier, TierCatalog};
use crate::ports::{CourseReader, TierRepository};

#[derive(Debug, Clone)]
pub struct ListTiersForCourseQuery {
    pub course_id: CourseId,
}

/// Granting tiers in display order, plus how to buy the course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiersForCourse {
    pub tiers: Vec<SubscriptionTier>,

    /// `None` when no active tier grants the course.
    pub checkout: Option<CheckoutRoute>,
}

pub struct ListTiersForCourseHandler {
    courses: Arc<dyn CourseReader>,
    tiers: Arc<dyn TierRepository>,
}

impl ListTiersForCourseHandler {
    pub fn new(courses: Arc<dyn CourseReader>, tiers: Arc<dyn TierRepository>) -> Self {
        Self { courses, tiers }
    }

    pub async fn handle(
        &self,
        query: ListTiersForCourseQuery,
    ) -> Result<TiersForCourse, BillingError> {
        let course = self
            .courses
            .find_by_id(&query.course_id)
            .await?
            .ok_or_else(|| BillingError::not_found(Resource::Course, query.course_id))?;

        let catalog = TierCatalog::new(self.tiers.list_for_community(&course.community_id).await?);

        Ok(TiersForCourse {
            tiers: catalog
                .tiers_granting_course(&course.id)
                .into_iter()
                .cloned()
                .collect(),
            checkout: catalog.checkout_for_course(&course.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPlatformStore;
    use crate::domain::access::{AccessPolicy, Course, CourseAccessConfig};
    use crate::domain::foundation::{CommunityId, Money, TierId, UserId};
    use crate::domain::tier::TierFeature;

    struct Fixture {
        handler: ListTiersForCourseHandler,
        store: Arc<InMemoryPlatformStore>,
        community: CommunityId,
        course: CourseId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryPlatformStore::new());
        let community = CommunityId::new();
        let course = CourseId::new();
        store
            .add_course(Course {
                id: course,
                community_id: community,
                owner_id: UserId::new("owner").unwrap(),
                title: "Lifetimes".to_string(),
                access: CourseAccessConfig::new([AccessPolicy::PaidSubscription]),
            })
            .await;
        Fixture {
            handler: ListTiersForCourseHandler::new(store.clone(), store.clone()),
            store,
            community,
            course,
        }
    }

    fn tier(f: &Fixture, name: &str, price: i64) -> SubscriptionTier {
        SubscriptionTier::new(
            TierId::new(),
            f.community,
            name,
            Money::new(price, "RUB").unwrap(),
        )
    }

    #[tokio::test]
    async fn cheapest_granting_tier_goes_through_gateway() {
        let f = fixture().await;
        let basic = tier(&f, "Basic", 49000)
            .with_features([TierFeature::SelectedCourses])
            .with_courses([f.course]);
        let basic_id = basic.id;
        f.store.add_tier(basic).await;
        f.store
            .add_tier(tier(&f, "Pro", 99000).with_features([TierFeature::AllCourses]))
            .await;
        f.store
            .add_tier(tier(&f, "Chat", 10000).with_features([TierFeature::PrivateChat]))
            .await;

        let result = f
            .handler
            .handle(ListTiersForCourseQuery { course_id: f.course })
            .await
            .unwrap();

        assert_eq!(result.tiers.len(), 2);
        assert_eq!(result.checkout, Some(CheckoutRoute::Gateway { tier_id: basic_id }));
    }

    #[tokio::test]
    async fn payment_url_override_wins() {
        let f = fixture().await;
        f.store
            .add_tier(tier(&f, "Basic", 49000).with_features([TierFeature::AllCourses]))
            .await;
        f.store
            .add_tier(
                tier(&f, "Partner", 99000)
                    .with_features([TierFeature::AllCourses])
                    .with_payment_url("https://partner.example.com/buy"),
            )
            .await;

        let result = f
            .handler
            .handle(ListTiersForCourseQuery { course_id: f.course })
            .await
            .unwrap();

        assert_eq!(
            result.checkout,
            Some(CheckoutRoute::DirectLink {
                url: "https://partner.example.com/buy".to_string()
            })
        );
    }

    #[tokio::test]
    async fn inactive_tiers_are_hidden() {
        let f = fixture().await;
        f.store
            .add_tier(
                tier(&f, "Legacy", 49000)
                    .with_features([TierFeature::AllCourses])
                    .inactive(),
            )
            .await;

        let result = f
            .handler
            .handle(ListTiersForCourseQuery { course_id: f.course })
            .await
            .unwrap();

        assert!(result.tiers.is_empty());
        assert!(result.checkout.is_none());
    }
}
