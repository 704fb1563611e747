//! In-memory tiers, courses, communities and profiles.
//!
//! One store implements every read-only platform port so fixtures can be
//! seeded in one place.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::access::Course;
use crate::domain::foundation::{CommunityId, CourseId, DomainError, TierId, UserId};
use crate::domain::tier::SubscriptionTier;
use crate::ports::{
    Community, CommunityReader, CourseReader, ProfileReader, TierRepository, UserProfile,
};

#[derive(Default)]
pub struct InMemoryPlatformStore {
    tiers: RwLock<HashMap<TierId, SubscriptionTier>>,
    courses: RwLock<HashMap<CourseId, Course>>,
    communities: RwLock<HashMap<CommunityId, Community>>,
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryPlatformStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_tier(&self, tier: SubscriptionTier) {
        self.tiers.write().await.insert(tier.id, tier);
    }

    pub async fn add_course(&self, course: Course) {
        self.courses.write().await.insert(course.id, course);
    }

    pub async fn add_community(&self, community: Community) {
        self.communities.write().await.insert(community.id, community);
    }

    pub async fn add_profile(&self, profile: UserProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
    }
}

#[async_trait]
impl TierRepository for InMemoryPlatformStore {
    async fn find_by_id(&self, id: &TierId) -> Result<Option<SubscriptionTier>, DomainError> {
        Ok(self.tiers.read().await.get(id).cloned())
    }

    async fn list_for_community(
        &self,
        community_id: &CommunityId,
    ) -> Result<Vec<SubscriptionTier>, DomainError> {
        Ok(self
            .tiers
            .read()
            .await
            .values()
            .filter(|t| t.community_id == *community_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseReader for InMemoryPlatformStore {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        Ok(self.courses.read().await.get(id).cloned())
    }
}

#[async_trait]
impl CommunityReader for InMemoryPlatformStore {
    async fn find_by_id(&self, id: &CommunityId) -> Result<Option<Community>, DomainError> {
        Ok(self.communities.read().await.get(id).cloned())
    }
}

#[async_trait]
impl ProfileReader for InMemoryPlatformStore {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}
