//! HTTP adapter for payment endpoints.
//!
//! - `POST /api/payments/create-subscription` - Start a subscription payment
//! - `POST /api/payments/webhook/yookassa` - Gateway notifications
//! - `GET /api/payments/memberships` - Caller's memberships with derived flags
//! - `POST /api/payments/free-membership` - Join a free tier

pub mod dto;
mod handlers;
mod routes;

pub use routes::payment_routes;
