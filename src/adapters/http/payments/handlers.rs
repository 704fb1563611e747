//! HTTP handlers for payment endpoints.
//!
//! These connect axum routes to the payment and membership command/query
//! handlers.

use axum::{
    body::Bytes,
    extract::{Json, Query, State},
    response::IntoResponse,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::adapters::yookassa::parse_notification;
use crate::application::{HandlePaymentWebhookCommand, ListMembershipsQuery, WebhookOutcome};
use crate::domain::billing::BillingError;
use crate::domain::foundation::Timestamp;
use crate::domain::membership::MembershipView;

use super::dto::{
    CreateSubscriptionRequest, CreateSubscriptionResponse, FreeMembershipRequest,
    MembershipResponse, MembershipsQuery, WebhookAck,
};

/// POST /api/payments/create-subscription
pub async fn create_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = request.into_command(user.id)?;
    let result = state.create_subscription_payment_handler().handle(cmd).await?;

    Ok(Json(CreateSubscriptionResponse::from(result)))
}

/// POST /api/payments/webhook/yookassa
///
/// Unauthenticated. Answers 200 once the notification is resolved, including
/// replays and notifications that do not apply, so the gateway stops
/// redelivering.
pub async fn yookassa_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let notification = parse_notification(&body).map_err(|e| {
        tracing::warn!(error = %e.message, "Rejected webhook body");
        BillingError::invalid_state(e.message)
    })?;

    let payment_id = notification.payment_id.clone();
    let outcome = state
        .webhook_handler()
        .handle(HandlePaymentWebhookCommand { notification })
        .await?;

    match &outcome {
        WebhookOutcome::Ignored(reason) => {
            tracing::info!(provider_payment_id = %payment_id, reason = %reason, "Webhook ignored");
        }
        other => {
            tracing::info!(
                provider_payment_id = %payment_id,
                outcome = ?other,
                "Webhook processed"
            );
        }
    }

    Ok(Json(WebhookAck { success: true }))
}

/// GET /api/payments/memberships?communityId=
pub async fn list_memberships(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MembershipsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let views = state
        .list_memberships_handler()
        .handle(ListMembershipsQuery {
            user_id: user.id,
            community_id: query.community_id()?,
        })
        .await?;

    let body: Vec<MembershipResponse> = views.into_iter().map(MembershipResponse::from).collect();
    Ok(Json(body))
}

/// POST /api/payments/free-membership
pub async fn join_free_membership(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<FreeMembershipRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = request.into_command(user.id)?;
    let membership = state.join_free_tier_handler().handle(cmd).await?;

    Ok(Json(MembershipResponse::from(MembershipView::at(
        membership,
        Timestamp::now(),
    ))))
}
