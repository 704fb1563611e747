//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::access::{
    CheckCourseAccessHandler, CheckCourseAccessQuery, ListTiersForCourseHandler,
    ListTiersForCourseQuery, TiersForCourse, UnlockPromoCodeCommand, UnlockPromoCodeHandler,
};
pub use handlers::membership::{
    ActivateOrRenewCommand, ActivateOrRenewHandler, GetActiveMembershipHandler,
    GetActiveMembershipQuery, JoinFreeTierCommand, JoinFreeTierHandler, ListMembershipsHandler,
    ListMembershipsQuery,
};
pub use handlers::payment::{
    CheckoutSettings, CreateSubscriptionPaymentCommand, CreateSubscriptionPaymentHandler,
    CreateSubscriptionPaymentResult, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    WebhookOutcome, WebhookVerification,
};
