//! PostgreSQL implementation of TierRepository.
//!
//! Prices are stored as `NUMERIC(12, 2)` in the community's billing
//! currency; they are read back as text and parsed into `Money`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CommunityId, CourseId, DomainError, Money, TierId, Timestamp};
use crate::domain::tier::{SubscriptionTier, TierFeature};
use crate::ports::TierRepository;

use super::database_error;

pub struct PostgresTierRepository {
    pool: PgPool,
    currency: String,
}

impl PostgresTierRepository {
    /// `currency` is the ISO code tier prices are denominated in.
    pub fn new(pool: PgPool, currency: impl Into<String>) -> Self {
        Self {
            pool,
            currency: currency.into(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TierRow {
    id: Uuid,
    community_id: Uuid,
    name: String,
    description: Option<String>,
    price_monthly: String,
    price_yearly: Option<String>,
    is_free: bool,
    is_active: bool,
    features: Vec<String>,
    selected_course_ids: Vec<Uuid>,
    payment_url: Option<String>,
    position: i32,
    created_at: DateTime<Utc>,
}

impl TierRow {
    fn into_tier(self, currency: &str) -> Result<SubscriptionTier, DomainError> {
        let price = |raw: &str| {
            Money::from_gateway_value(raw, currency)
                .map_err(|e| DomainError::database(format!("Invalid tier price: {}", e)))
        };
        let monthly_price = price(&self.price_monthly)?;
        let yearly_price = self.price_yearly.as_deref().map(price).transpose()?;

        let mut tier = SubscriptionTier::new(
            TierId::from_uuid(self.id),
            CommunityId::from_uuid(self.community_id),
            self.name,
            monthly_price,
        )
        .with_features(self.features.iter().map(|f| TierFeature::parse(f)))
        .with_courses(self.selected_course_ids.into_iter().map(CourseId::from_uuid));

        tier.description = self.description;
        tier.yearly_price = yearly_price;
        tier.is_free = self.is_free || tier.monthly_price.amount_minor() == 0;
        tier.is_active = self.is_active;
        tier.payment_url = self.payment_url.filter(|u| !u.trim().is_empty());
        tier.position = self.position;
        tier.created_at = Timestamp::from_datetime(self.created_at);
        Ok(tier)
    }
}

const SELECT_TIERS: &str = r#"
    SELECT id, community_id, name, description,
           price_monthly::text AS price_monthly, price_yearly::text AS price_yearly,
           is_free, is_active, features, selected_course_ids, payment_url, position, created_at
    FROM subscription_tiers
"#;

#[async_trait]
impl TierRepository for PostgresTierRepository {
    async fn find_by_id(&self, id: &TierId) -> Result<Option<SubscriptionTier>, DomainError> {
        let row: Option<TierRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_TIERS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to load subscription tier", e))?;

        row.map(|r| r.into_tier(&self.currency)).transpose()
    }

    async fn list_for_community(
        &self,
        community_id: &CommunityId,
    ) -> Result<Vec<SubscriptionTier>, DomainError> {
        let rows: Vec<TierRow> = sqlx::query_as(&format!(
            "{} WHERE community_id = $1 ORDER BY position, created_at",
            SELECT_TIERS
        ))
        .bind(community_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list subscription tiers", e))?;

        rows.into_iter()
            .map(|r| r.into_tier(&self.currency))
            .collect()
    }
}
