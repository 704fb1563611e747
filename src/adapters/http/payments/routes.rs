//! Axum router for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    create_subscription, join_free_membership, list_memberships, yookassa_webhook,
};

/// Routes mounted under `/api/payments`.
///
/// # Routes
///
/// ## User endpoints (require authentication)
/// - `POST /create-subscription` - Start a gateway checkout
/// - `GET /memberships` - List the caller's memberships
/// - `POST /free-membership` - Join a free tier
///
/// ## Webhook endpoints (no auth)
/// - `POST /webhook/yookassa` - Gateway payment notifications
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-subscription", post(create_subscription))
        .route("/memberships", get(list_memberships))
        .route("/free-membership", post(join_free_membership))
        .route("/webhook/yookassa", post(yookassa_webhook))
}
