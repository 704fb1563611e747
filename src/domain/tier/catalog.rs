//! Community-scoped tier catalog.
//!
//! Answers "which plans unlock this course" and "how should the user pay
//! for it".

use serde::Serialize;

use crate::domain::foundation::{CourseId, TierId};

use super::SubscriptionTier;

/// How the client should obtain a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckoutRoute {
    /// A granting tier is free; join without paying.
    FreeJoin {
        #[serde(rename = "tierId")]
        tier_id: TierId,
    },

    /// A granting tier has its own payment URL; the gateway flow is skipped.
    DirectLink { url: String },

    /// Pay through the gateway for this tier.
    Gateway {
        #[serde(rename = "tierId")]
        tier_id: TierId,
    },
}

/// The tiers of one community, ordered by display position.
#[derive(Debug, Clone, Default)]
pub struct TierCatalog {
    tiers: Vec<SubscriptionTier>,
}

impl TierCatalog {
    pub fn new(mut tiers: Vec<SubscriptionTier>) -> Self {
        tiers.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| a.monthly_price.amount_minor().cmp(&b.monthly_price.amount_minor()))
        });
        Self { tiers }
    }

    pub fn tiers(&self) -> &[SubscriptionTier] {
        &self.tiers
    }

    /// Looks up a tier, but only while it is active.
    pub fn find_active(&self, tier_id: &TierId) -> Option<&SubscriptionTier> {
        self.tiers
            .iter()
            .find(|tier| tier.id == *tier_id && tier.is_active)
    }

    /// Active tiers whose entitlements include `course_id`, in display order.
    pub fn tiers_granting_course(&self, course_id: &CourseId) -> Vec<&SubscriptionTier> {
        self.tiers
            .iter()
            .filter(|tier| tier.is_active && tier.grants_course(course_id))
            .collect()
    }

    /// Picks the checkout path for a course.
    ///
    /// Preference: a free granting tier, then a granting tier with a direct
    /// payment URL, then the cheapest granting tier via the gateway.
    pub fn checkout_for_course(&self, course_id: &CourseId) -> Option<CheckoutRoute> {
        let granting = self.tiers_granting_course(course_id);

        if let Some(free) = granting.iter().find(|tier| tier.is_free) {
            return Some(CheckoutRoute::FreeJoin { tier_id: free.id });
        }

        if let Some(url) = granting.iter().find_map(|tier| tier.direct_payment_url()) {
            return Some(CheckoutRoute::DirectLink {
                url: url.to_string(),
            });
        }

        granting
            .iter()
            .min_by_key(|tier| tier.monthly_price.amount_minor())
            .map(|tier| CheckoutRoute::Gateway { tier_id: tier.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CommunityId, Money};
    use crate::domain::tier::TierFeature;

    fn tier(name: &str, price: i64, position: i32) -> SubscriptionTier {
        let mut tier = SubscriptionTier::new(
            TierId::new(),
            CommunityId::new(),
            name,
            Money::new(price, "RUB").unwrap(),
        );
        tier.position = position;
        tier
    }

    #[test]
    fn inactive_tiers_are_invisible() {
        let course = CourseId::new();
        let hidden = tier("Old", 50000, 0)
            .with_features([TierFeature::AllCourses])
            .inactive();
        let hidden_id = hidden.id;
        let catalog = TierCatalog::new(vec![hidden]);

        assert!(catalog.find_active(&hidden_id).is_none());
        assert!(catalog.tiers_granting_course(&course).is_empty());
        assert!(catalog.checkout_for_course(&course).is_none());
    }

    #[test]
    fn granting_tiers_follow_display_order() {
        let course = CourseId::new();
        let pro = tier("Pro", 99000, 2).with_features([TierFeature::AllCourses]);
        let basic = tier("Basic", 49000, 1)
            .with_features([TierFeature::SelectedCourses])
            .with_courses([course]);
        let chat = tier("Chat", 19000, 0).with_features([TierFeature::PrivateChat]);
        let catalog = TierCatalog::new(vec![pro, basic, chat]);

        let names: Vec<&str> = catalog
            .tiers_granting_course(&course)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Basic", "Pro"]);
    }

    #[test]
    fn direct_link_wins_over_gateway() {
        let course = CourseId::new();
        let cheap = tier("Basic", 49000, 0).with_features([TierFeature::AllCourses]);
        let linked = tier("Pro", 99000, 1)
            .with_features([TierFeature::AllCourses])
            .with_payment_url("https://pay.example/pro");
        let catalog = TierCatalog::new(vec![cheap, linked]);

        assert_eq!(
            catalog.checkout_for_course(&course),
            Some(CheckoutRoute::DirectLink {
                url: "https://pay.example/pro".to_string()
            })
        );
    }

    #[test]
    fn gateway_uses_cheapest_granting_tier() {
        let course = CourseId::new();
        let pro = tier("Pro", 99000, 0).with_features([TierFeature::AllCourses]);
        let basic = tier("Basic", 49000, 1).with_features([TierFeature::AllCourses]);
        let basic_id = basic.id;
        let catalog = TierCatalog::new(vec![pro, basic]);

        assert_eq!(
            catalog.checkout_for_course(&course),
            Some(CheckoutRoute::Gateway { tier_id: basic_id })
        );
    }

    #[test]
    fn free_tier_wins() {
        let course = CourseId::new();
        let free = tier("Free", 0, 5).with_features([TierFeature::AllCourses]);
        let free_id = free.id;
        let linked = tier("Pro", 99000, 0)
            .with_features([TierFeature::AllCourses])
            .with_payment_url("https://pay.example/pro");
        let catalog = TierCatalog::new(vec![linked, free]);

        assert_eq!(
            catalog.checkout_for_course(&course),
            Some(CheckoutRoute::FreeJoin { tier_id: free_id })
        );
    }

    #[test]
    fn checkout_route_serializes_with_type_tag() {
        let json = serde_json::to_value(CheckoutRoute::DirectLink {
            url: "https://x".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "direct_link");
        assert_eq!(json["url"], "https://x");
    }
}
