//! HTTP adapter for course access endpoints.
//!
//! - `GET /api/courses/{id}/access` - Can the caller open this course
//! - `POST /api/courses/{id}/promo-code` - Check a promo code
//! - `GET /api/courses/{id}/tiers` - Plans that unlock the course

pub mod dto;
mod handlers;
mod routes;

pub use routes::course_routes;
