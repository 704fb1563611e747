//! HTTP handlers for course access endpoints.

use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::{
    CheckCourseAccessQuery, ListTiersForCourseQuery, UnlockPromoCodeCommand,
};
use crate::domain::foundation::CourseId;

use super::dto::{AccessQuery, AccessResponse, PromoCodeRequest, PromoCodeResponse, TiersResponse};

/// GET /api/courses/{course_id}/access?unlocked=id1,id2
pub async fn check_access(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(course_id): Path<CourseId>,
    Query(query): Query<AccessQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let decision = state
        .check_course_access_handler()
        .handle(CheckCourseAccessQuery {
            user,
            course_id,
            unlocked_promo_course_ids: query.unlocked_course_ids()?,
        })
        .await?;

    Ok(Json(AccessResponse::from(decision)))
}

/// POST /api/courses/{course_id}/promo-code
///
/// Only answers whether the code matches. The client keeps the unlocked set.
pub async fn unlock_promo_code(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(course_id): Path<CourseId>,
    Json(request): Json<PromoCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let unlocked = state
        .unlock_promo_code_handler()
        .handle(UnlockPromoCodeCommand {
            course_id,
            promo_input: request.promo_code.unwrap_or_default(),
        })
        .await?;

    Ok(Json(PromoCodeResponse { unlocked }))
}

/// GET /api/courses/{course_id}/tiers
pub async fn list_tiers(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .list_tiers_for_course_handler()
        .handle(ListTiersForCourseQuery { course_id })
        .await?;

    Ok(Json(TiersResponse::from(result)))
}
