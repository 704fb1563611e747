//! PostgreSQL implementation of MembershipRepository.
//!
//! One row per (user, community). Activation is a single upsert and lazy
//! expiry is a conditional update, so neither blind-overwrites a concurrent
//! change.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    CommunityId, DomainError, MembershipId, TierId, Timestamp, UserId,
};
use crate::domain::membership::{Membership, MembershipActivation, MembershipStatus, RenewalPeriod};
use crate::ports::{MembershipRepository, UpsertOutcome};

use super::{database_error, parse_column};

pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a membership.
#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    user_id: String,
    community_id: Uuid,
    subscription_tier_id: Option<Uuid>,
    status: String,
    started_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    renewal_period: String,
    external_subscription_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    membership: MembershipRow,
    inserted: bool,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = DomainError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership {
            id: MembershipId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?,
            community_id: CommunityId::from_uuid(row.community_id),
            tier_id: row.subscription_tier_id.map(TierId::from_uuid),
            status: parse_column::<MembershipStatus>("status", &row.status)?,
            started_at: Timestamp::from_datetime(row.started_at),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            renewal_period: parse_column::<RenewalPeriod>("renewal_period", &row.renewal_period)?,
            external_subscription_id: row.external_subscription_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const COLUMNS: &str = "id, user_id, community_id, subscription_tier_id, status, started_at, \
                       expires_at, renewal_period, external_subscription_id, \
                       created_at, updated_at";

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn upsert_activation(
        &self,
        activation: &MembershipActivation,
    ) -> Result<UpsertOutcome, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO memberships (
                id, user_id, community_id, subscription_tier_id, status, started_at,
                expires_at, renewal_period, external_subscription_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, 'active', $5, $6, $7, $8, $5, $5)
            ON CONFLICT (user_id, community_id) DO UPDATE SET
                subscription_tier_id = EXCLUDED.subscription_tier_id,
                status = 'active',
                started_at = EXCLUDED.started_at,
                expires_at = EXCLUDED.expires_at,
                renewal_period = EXCLUDED.renewal_period,
                external_subscription_id = EXCLUDED.external_subscription_id,
                updated_at = EXCLUDED.updated_at
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            COLUMNS
        );

        let row: UpsertRow = sqlx::query_as(&sql)
            .bind(MembershipId::new().as_uuid())
            .bind(activation.user_id.as_str())
            .bind(activation.community_id.as_uuid())
            .bind(activation.tier_id.map(|t| *t.as_uuid()))
            .bind(activation.started_at.as_datetime())
            .bind(activation.expires_at.map(|t| t.into_datetime()))
            .bind(activation.renewal_period.as_str())
            .bind(&activation.external_subscription_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("Failed to upsert membership", e))?;

        Ok(UpsertOutcome {
            membership: Membership::try_from(row.membership)?,
            inserted: row.inserted,
        })
    }

    async fn find_by_user_and_community(
        &self,
        user_id: &UserId,
        community_id: &CommunityId,
    ) -> Result<Option<Membership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(&format!(
            "SELECT {} FROM memberships WHERE user_id = $1 AND community_id = $2",
            COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(community_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to load membership", e))?;

        row.map(Membership::try_from).transpose()
    }

    async fn expire_if_unchanged(
        &self,
        id: &MembershipId,
        expires_at_read: Timestamp,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET status = 'expired', updated_at = $3
            WHERE id = $1 AND status = 'active' AND expires_at = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(expires_at_read.as_datetime())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to expire membership", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        community_id: Option<&CommunityId>,
    ) -> Result<Vec<Membership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM memberships
            WHERE user_id = $1 AND ($2::uuid IS NULL OR community_id = $2)
            ORDER BY created_at DESC
            "#,
            COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(community_id.map(|c| *c.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list memberships", e))?;

        rows.into_iter().map(Membership::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MembershipRow {
        let now = Utc::now();
        MembershipRow {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            community_id: Uuid::new_v4(),
            subscription_tier_id: None,
            status: "cancelled".to_string(),
            started_at: now,
            expires_at: None,
            renewal_period: "non_renewing".to_string(),
            external_subscription_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_with_legacy_spelling() {
        let membership = Membership::try_from(row()).unwrap();

        assert_eq!(membership.status, MembershipStatus::Canceled);
        assert_eq!(membership.renewal_period, RenewalPeriod::NonRenewing);
        assert!(membership.expires_at.is_none());
    }

    #[test]
    fn unknown_renewal_period_is_rejected() {
        let mut bad = row();
        bad.renewal_period = "weekly".to_string();

        assert!(Membership::try_from(bad).is_err());
    }
}
