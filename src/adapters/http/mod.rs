//! HTTP adapters - REST API over axum.
//!
//! - `payments` - checkout, gateway webhook and membership endpoints
//! - `courses` - access checks, promo codes and tier listing
//! - `middleware` - bearer authentication
//! - `error` - `BillingError` to `{code, message}` responses

pub mod courses;
pub mod error;
pub mod middleware;
pub mod payments;
mod router;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::{app_router, HttpSettings};
pub use state::AppState;
