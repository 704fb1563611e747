//! Course and requester as seen by the access evaluator.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CommunityId, CourseId, UserId};

use super::CourseAccessConfig;

/// A course, reduced to what access control needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub community_id: CommunityId,
    pub owner_id: UserId,
    pub title: String,
    pub access: CourseAccessConfig,
}

/// The user asking for access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSubject {
    pub user_id: UserId,
    pub email: Option<String>,
    pub rating: i32,
}

impl AccessSubject {
    pub fn new(user_id: UserId, email: Option<String>, rating: i32) -> Self {
        Self {
            user_id,
            email,
            rating,
        }
    }

    /// Lower-cased, trimmed email for comparisons.
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }
}
