//! HTTP DTOs for payment and membership endpoints.
//!
//! JSON is camelCase to match the web client.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::application::{
    CreateSubscriptionPaymentCommand, CreateSubscriptionPaymentResult, JoinFreeTierCommand,
};
use crate::domain::billing::BillingError;
use crate::domain::foundation::{CommunityId, MembershipId, TierId, Timestamp, UserId};
use crate::domain::membership::{MembershipStatus, MembershipView, RenewalPeriod};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/payments/create-subscription`.
///
/// Fields are optional here so a missing one is reported as a 400 with the
/// field name rather than a generic JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub community_id: Option<String>,
    pub subscription_tier_id: Option<String>,
    #[serde(default)]
    pub return_url: Option<String>,
}

impl CreateSubscriptionRequest {
    pub fn into_command(
        self,
        user_id: UserId,
    ) -> Result<CreateSubscriptionPaymentCommand, BillingError> {
        let return_url = self
            .return_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        if let Some(url) = &return_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(BillingError::validation(
                    "returnUrl",
                    "must be an absolute http(s) URL",
                ));
            }
        }

        Ok(CreateSubscriptionPaymentCommand {
            user_id,
            community_id: parse_id("communityId", self.community_id.as_deref())?,
            tier_id: parse_id("subscriptionTierId", self.subscription_tier_id.as_deref())?,
            return_url,
        })
    }
}

/// Body of `POST /api/payments/free-membership`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeMembershipRequest {
    pub community_id: Option<String>,
    pub subscription_tier_id: Option<String>,
}

impl FreeMembershipRequest {
    pub fn into_command(self, user_id: UserId) -> Result<JoinFreeTierCommand, BillingError> {
        Ok(JoinFreeTierCommand {
            user_id,
            community_id: parse_id("communityId", self.community_id.as_deref())?,
            tier_id: parse_id("subscriptionTierId", self.subscription_tier_id.as_deref())?,
        })
    }
}

/// Query string of `GET /api/payments/memberships`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipsQuery {
    pub community_id: Option<String>,
}

impl MembershipsQuery {
    pub fn community_id(&self) -> Result<Option<CommunityId>, BillingError> {
        match self.community_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_id("communityId", Some(raw)).map(Some),
        }
    }
}

fn parse_id<T: FromStr>(field: &str, raw: Option<&str>) -> Result<T, BillingError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BillingError::validation(field, "is required"))?;
    raw.parse()
        .map_err(|_| BillingError::validation(field, "must be a UUID"))
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    /// Where to send the buyer.
    pub confirmation_url: String,
    pub transaction_id: String,
    pub payment_id: String,
}

impl From<CreateSubscriptionPaymentResult> for CreateSubscriptionResponse {
    fn from(result: CreateSubscriptionPaymentResult) -> Self {
        Self {
            confirmation_url: result.confirmation_url,
            transaction_id: result.transaction_id.to_string(),
            payment_id: result.payment_id,
        }
    }
}

/// A membership with the flags computed at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub id: MembershipId,
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub subscription_tier_id: Option<TierId>,
    pub status: MembershipStatus,
    pub started_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub renewal_period: RenewalPeriod,
    pub external_subscription_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub is_expired: bool,
    pub is_active: bool,
}

impl From<MembershipView> for MembershipResponse {
    fn from(view: MembershipView) -> Self {
        let m = view.membership;
        Self {
            id: m.id,
            user_id: m.user_id,
            community_id: m.community_id,
            subscription_tier_id: m.tier_id,
            status: m.status,
            started_at: m.started_at,
            expires_at: m.expires_at,
            renewal_period: m.renewal_period,
            external_subscription_id: m.external_subscription_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
            is_expired: view.is_expired,
            is_active: view.is_active,
        }
    }
}

/// Acknowledgement returned to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::membership::MembershipActivation;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn create_request_reads_camel_case() {
        let community = CommunityId::new();
        let tier = TierId::new();
        let json = format!(
            r#"{{"communityId":"{}","subscriptionTierId":"{}","returnUrl":"{}"}}"#,
            community, tier, "https://app.test/back"
        );
        let request: CreateSubscriptionRequest = serde_json::from_str(&json).unwrap();
        let cmd = request.into_command(user()).unwrap();

        assert_eq!(cmd.community_id, community);
        assert_eq!(cmd.tier_id, tier);
        assert_eq!(cmd.return_url.as_deref(), Some("https://app.test/back"));
    }

    #[test]
    fn missing_tier_names_the_field() {
        let request = CreateSubscriptionRequest {
            community_id: Some(CommunityId::new().to_string()),
            ..Default::default()
        };

        match request.into_command(user()).unwrap_err() {
            BillingError::Validation { field, .. } => assert_eq!(field, "subscriptionTierId"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_id_is_rejected() {
        let request = FreeMembershipRequest {
            community_id: Some("not-a-uuid".to_string()),
            subscription_tier_id: Some(TierId::new().to_string()),
        };

        assert!(matches!(
            request.into_command(user()),
            Err(BillingError::Validation { .. })
        ));
    }

    #[test]
    fn blank_return_url_falls_back_to_default() {
        let request = CreateSubscriptionRequest {
            community_id: Some(CommunityId::new().to_string()),
            subscription_tier_id: Some(TierId::new().to_string()),
            return_url: Some("  ".to_string()),
        };

        assert_eq!(request.into_command(user()).unwrap().return_url, None);
    }

    #[test]
    fn relative_return_url_is_rejected() {
        let request = CreateSubscriptionRequest {
            community_id: Some(CommunityId::new().to_string()),
            subscription_tier_id: Some(TierId::new().to_string()),
            return_url: Some("/communities/1".to_string()),
        };

        assert!(request.into_command(user()).is_err());
    }

    #[test]
    fn empty_community_filter_means_all() {
        let query = MembershipsQuery {
            community_id: Some("".to_string()),
        };
        assert_eq!(query.community_id().unwrap(), None);
    }

    #[test]
    fn membership_response_is_camel_case_with_flags() {
        let now = Timestamp::now();
        let membership =
            MembershipActivation::monthly(user(), CommunityId::new(), None, None, now)
                .into_membership(MembershipId::new());

        let json = serde_json::to_value(MembershipResponse::from(MembershipView::at(
            membership, now,
        )))
        .unwrap();

        assert_eq!(json["isActive"], true);
        assert_eq!(json["isExpired"], false);
        assert_eq!(json["status"], "active");
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("subscriptionTierId").is_some());
    }
}
