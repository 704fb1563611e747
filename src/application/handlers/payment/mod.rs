//! Payment handlers.
//!
//! ## Commands
//! - Creating a gateway payment for a paid tier
//! - Applying a gateway webhook to its Transaction

mod create_subscription_payment;
mod handle_payment_webhook;

pub use create_subscription_payment::{
    CheckoutSettings, CreateSubscriptionPaymentCommand, CreateSubscriptionPaymentHandler,
    CreateSubscriptionPaymentResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome,
    WebhookVerification,
};
