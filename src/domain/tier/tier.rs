//! Subscription tier entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CommunityId, CourseId, Money, TierId, Timestamp};

use super::TierFeature;

/// A priced bundle of entitlements a community offers.
///
/// # Invariants
///
/// - `features` is an ordered set (no duplicates)
/// - with `SelectedCourses` but not `AllCourses`, `course_ids` is the
///   authoritative entitlement list
/// - only consulted while `is_active`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionTier {
    pub id: TierId,
    pub community_id: CommunityId,
    pub name: String,
    pub description: Option<String>,
    pub monthly_price: Money,
    pub yearly_price: Option<Money>,
    pub is_free: bool,
    pub is_active: bool,
    features: Vec<TierFeature>,
    pub course_ids: Vec<CourseId>,

    /// Direct-link checkout that bypasses the gateway flow.
    pub payment_url: Option<String>,

    /// Display order within the community.
    pub position: i32,
    pub created_at: Timestamp,
}

impl SubscriptionTier {
    /// Creates an active tier with no features.
    pub fn new(
        id: TierId,
        community_id: CommunityId,
        name: impl Into<String>,
        monthly_price: Money,
    ) -> Self {
        Self {
            id,
            community_id,
            name: name.into(),
            description: None,
            is_free: monthly_price.amount_minor() == 0,
            monthly_price,
            yearly_price: None,
            is_active: true,
            features: Vec::new(),
            course_ids: Vec::new(),
            payment_url: None,
            position: 0,
            created_at: Timestamp::now(),
        }
    }

    /// Replaces the feature set, dropping duplicates but keeping order.
    pub fn with_features(mut self, features: impl IntoIterator<Item = TierFeature>) -> Self {
        self.features.clear();
        for feature in features {
            if !self.features.contains(&feature) {
                self.features.push(feature);
            }
        }
        self
    }

    pub fn with_courses(mut self, course_ids: impl IntoIterator<Item = CourseId>) -> Self {
        self.course_ids = course_ids.into_iter().collect();
        self
    }

    pub fn with_payment_url(mut self, url: impl Into<String>) -> Self {
        self.payment_url = Some(url.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn features(&self) -> &[TierFeature] {
        &self.features
    }

    pub fn has_feature(&self, feature: &TierFeature) -> bool {
        self.features.contains(feature)
    }

    /// Whether this tier's entitlements include `course_id`.
    ///
    /// Ignores `is_active`; the catalog filters inactive tiers.
    pub fn grants_course(&self, course_id: &CourseId) -> bool {
        if self.has_feature(&TierFeature::AllCourses) {
            return true;
        }
        self.has_feature(&TierFeature::SelectedCourses) && self.course_ids.contains(course_id)
    }

    /// Non-blank direct checkout URL, if configured.
    pub fn direct_payment_url(&self) -> Option<&str> {
        self.payment_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
