//! Read-only view of courses and their access configuration.

use async_trait::async_trait;

use crate::domain::access::Course;
use crate::domain::foundation::{CourseId, DomainError};

#[async_trait]
pub trait CourseReader: Send + Sync {
    /// Load a course with its parsed access policies.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the stored access tags cannot be parsed
    /// - `DatabaseError` on read failure
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;
}
