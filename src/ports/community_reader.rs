//! Read-only view of communities.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CommunityId, DomainError, UserId};

/// The parts of a community billing needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub owner_id: UserId,
}

#[async_trait]
pub trait CommunityReader: Send + Sync {
    async fn find_by_id(&self, id: &CommunityId) -> Result<Option<Community>, DomainError>;
}
