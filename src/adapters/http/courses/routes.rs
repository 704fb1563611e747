//! Axum router for course access endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{check_access, list_tiers, unlock_promo_code};

/// Routes mounted under `/api/courses`.
///
/// - `GET /:course_id/access` - Access decision (auth)
/// - `POST /:course_id/promo-code` - Promo code check (auth)
/// - `GET /:course_id/tiers` - Tiers that unlock the course
pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/:course_id/access", get(check_access))
        .route("/:course_id/promo-code", post(unlock_promo_code))
        .route("/:course_id/tiers", get(list_tiers))
}
