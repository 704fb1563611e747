//! Read-only view of user profiles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};

/// Profile fields the access rules look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: Option<String>,
    pub rating: i32,
}

impl UserProfile {
    /// Profile for a user the platform has no row for yet.
    pub fn blank(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            rating: 0,
        }
    }
}

#[async_trait]
pub trait ProfileReader: Send + Sync {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError>;
}
