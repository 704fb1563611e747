//! Error responses shared by every route.
//!
//! All failures leave the service as `{code, message}`. Gateway and storage
//! failures are logged in full but answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::billing::BillingError;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `TIER_NOT_FOUND`.
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Wraps `BillingError` so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub BillingError);

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BillingError::NotFound { .. } => StatusCode::NOT_FOUND,
            BillingError::InvalidState(_) | BillingError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            BillingError::Unauthenticated => StatusCode::UNAUTHORIZED,
            BillingError::Upstream(_) | BillingError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            BillingError::Upstream(detail) => {
                tracing::error!(error = %detail, "Payment gateway failure");
                ErrorResponse::new(
                    self.0.code().to_string(),
                    "Payment service is temporarily unavailable, please try again",
                )
            }
            BillingError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "Internal error");
                ErrorResponse::new(self.0.code().to_string(), "Internal server error")
            }
            BillingError::Unauthenticated => {
                ErrorResponse::new("UNAUTHENTICATED", self.0.message())
            }
            _ => ErrorResponse::new(self.0.code().to_string(), self.0.message()),
        };

        (status, Json(body)).into_response()
    }
}
