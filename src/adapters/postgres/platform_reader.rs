//! Read-only access to platform-owned tables: courses, communities and
//! profiles.
//!
//! Column names follow the platform schema. User ids are compared as text
//! because the platform keys profiles by auth UUID while this service treats
//! them as opaque strings.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::access::{AccessParams, Course, CourseAccessConfig};
use crate::domain::foundation::{CommunityId, CourseId, DomainError, UserId};
use crate::ports::{Community, CommunityReader, CourseReader, ProfileReader, UserProfile};

use super::database_error;

pub struct PostgresPlatformReader {
    pool: PgPool,
}

impl PostgresPlatformReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    community_id: Uuid,
    owner_id: String,
    title: String,
    access_types: Option<Vec<String>>,
    required_rating: Option<i32>,
    delay_days: Option<i32>,
    promo_code: Option<String>,
    gifted_emails: Option<String>,
}

impl TryFrom<CourseRow> for Course {
    type Error = DomainError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let params = AccessParams {
            required_rating: row.required_rating,
            delay_days: row.delay_days,
            promo_code: row.promo_code,
            gifted_emails: row.gifted_emails,
        };
        let tags = row.access_types.unwrap_or_default();

        Ok(Course {
            id: CourseId::from_uuid(row.id),
            community_id: CommunityId::from_uuid(row.community_id),
            owner_id: UserId::new(row.owner_id)
                .map_err(|e| DomainError::database(format!("Invalid course owner: {}", e)))?,
            title: row.title,
            access: CourseAccessConfig::from_tags(&tags, &params)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommunityRow {
    id: Uuid,
    name: String,
    owner_id: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    email: Option<String>,
    rating: i32,
}

#[async_trait]
impl CourseReader for PostgresPlatformReader {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, community_id, author_id::text AS owner_id, title, access_types,
                   required_rating, delay_days, promo_code, gifted_emails
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to load course", e))?;

        row.map(Course::try_from).transpose()
    }
}

#[async_trait]
impl CommunityReader for PostgresPlatformReader {
    async fn find_by_id(&self, id: &CommunityId) -> Result<Option<Community>, DomainError> {
        let row: Option<CommunityRow> = sqlx::query_as(
            "SELECT id, name, owner_id::text AS owner_id FROM communities WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to load community", e))?;

        row.map(|r| {
            Ok(Community {
                id: CommunityId::from_uuid(r.id),
                name: r.name,
                owner_id: UserId::new(r.owner_id).map_err(|e| {
                    DomainError::database(format!("Invalid community owner: {}", e))
                })?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl ProfileReader for PostgresPlatformReader {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT email, COALESCE(rating, 0) AS rating FROM profiles WHERE id::text = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to load profile", e))?;

        Ok(row.map(|r| UserProfile {
            user_id: user_id.clone(),
            email: r.email,
            rating: r.rating,
        }))
    }
}
