//! YooKassa payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for YooKassa, including:
//! - One-off payments with redirect confirmation
//! - Payment status lookups used to verify webhooks
//! - Notification body parsing
//!
//! YooKassa does not sign webhooks. Their authenticity is established by
//! re-reading the payment from the API (see `WebhookVerification`).

mod client;
mod mock_gateway;
mod wire;

pub use client::{YooKassaClient, YooKassaConfig, DEFAULT_API_BASE_URL};
pub use mock_gateway::MockPaymentGateway;
pub use wire::parse_notification;
