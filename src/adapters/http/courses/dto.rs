//! HTTP DTOs for course access endpoints.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::application::TiersForCourse;
use crate::domain::access::{AccessDecision, GrantReason};
use crate::domain::billing::BillingError;
use crate::domain::foundation::{CourseId, TierId};
use crate::domain::tier::{CheckoutRoute, SubscriptionTier};

/// Query string of `GET /api/courses/{id}/access`.
///
/// `unlocked` is the comma-separated list of course ids the client has
/// unlocked with a promo code in this session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessQuery {
    #[serde(default)]
    pub unlocked: Option<String>,
}

impl AccessQuery {
    pub fn unlocked_course_ids(&self) -> Result<HashSet<CourseId>, BillingError> {
        self.unlocked
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|_| BillingError::validation("unlocked", "must list course UUIDs"))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub has_access: bool,

    /// `owner`, `promo_unlocked` or the granting policy tag; null when denied.
    pub reason: Option<&'static str>,
}

impl From<AccessDecision> for AccessResponse {
    fn from(decision: AccessDecision) -> Self {
        let reason = match decision {
            AccessDecision::Granted(GrantReason::Owner) => Some("owner"),
            AccessDecision::Granted(GrantReason::PromoUnlocked) => Some("promo_unlocked"),
            AccessDecision::Granted(GrantReason::Policy(tag)) => Some(tag.as_str()),
            AccessDecision::Denied => None,
        };
        Self {
            has_access: decision.is_granted(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeRequest {
    #[serde(default)]
    pub promo_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromoCodeResponse {
    pub unlocked: bool,
}

/// One tier as shown on a course page. Prices are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierResponse {
    pub id: TierId,
    pub name: String,
    pub description: Option<String>,
    pub monthly_price: String,
    pub yearly_price: Option<String>,
    pub currency: String,
    pub is_free: bool,
    pub features: Vec<String>,
    pub payment_url: Option<String>,
}

impl From<SubscriptionTier> for TierResponse {
    fn from(tier: SubscriptionTier) -> Self {
        Self {
            features: tier.features().iter().map(|f| f.as_str().to_string()).collect(),
            id: tier.id,
            name: tier.name,
            description: tier.description,
            monthly_price: tier.monthly_price.to_gateway_value(),
            yearly_price: tier.yearly_price.as_ref().map(|p| p.to_gateway_value()),
            currency: tier.monthly_price.currency().to_string(),
            is_free: tier.is_free,
            payment_url: tier.payment_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TiersResponse {
    pub tiers: Vec<TierResponse>,
    pub checkout: Option<CheckoutRoute>,
}

impl From<TiersForCourse> for TiersResponse {
    fn from(result: TiersForCourse) -> Self {
        Self {
            tiers: result.tiers.into_iter().map(TierResponse::from).collect(),
            checkout: result.checkout,
        }
    }
}
