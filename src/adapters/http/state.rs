//! Shared application state for the HTTP routes.

use std::sync::Arc;

use crate::application::{
    ActivateOrRenewHandler, CheckCourseAccessHandler, CheckoutSettings,
    CreateSubscriptionPaymentHandler, GetActiveMembershipHandler, HandlePaymentWebhookHandler,
    JoinFreeTierHandler, ListMembershipsHandler, ListTiersForCourseHandler,
    UnlockPromoCodeHandler, WebhookVerification,
};
use crate::ports::{
    CommunityReader, CourseReader, EventPublisher, MembershipRepository, PaymentGateway,
    ProfileReader, SessionValidator, TierRepository, TransactionRepository,
};

/// Arc-wrapped ports plus the settings handlers need.
///
/// Cloned per request; handlers are built on demand from it.
#[derive(Clone)]
pub struct AppState {
    pub transactions: Arc<dyn TransactionRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub tiers: Arc<dyn TierRepository>,
    pub communities: Arc<dyn CommunityReader>,
    pub courses: Arc<dyn CourseReader>,
    pub profiles: Arc<dyn ProfileReader>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub checkout: CheckoutSettings,
    pub webhook_verification: WebhookVerification,
}

impl AppState {
    pub fn create_subscription_payment_handler(&self) -> CreateSubscriptionPaymentHandler {
        CreateSubscriptionPaymentHandler::new(
            self.tiers.clone(),
            self.communities.clone(),
            self.transactions.clone(),
            self.gateway.clone(),
            self.event_publisher.clone(),
            self.checkout.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.transactions.clone(),
            self.gateway.clone(),
            ActivateOrRenewHandler::new(self.memberships.clone(), self.event_publisher.clone()),
            self.event_publisher.clone(),
            self.webhook_verification,
        )
    }

    pub fn list_memberships_handler(&self) -> ListMembershipsHandler {
        ListMembershipsHandler::new(self.memberships.clone())
    }

    pub fn join_free_tier_handler(&self) -> JoinFreeTierHandler {
        JoinFreeTierHandler::new(
            self.tiers.clone(),
            self.communities.clone(),
            self.memberships.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn check_course_access_handler(&self) -> CheckCourseAccessHandler {
        CheckCourseAccessHandler::new(
            self.courses.clone(),
            self.profiles.clone(),
            self.tiers.clone(),
            GetActiveMembershipHandler::new(
                self.memberships.clone(),
                self.event_publisher.clone(),
            ),
        )
    }

    pub fn unlock_promo_code_handler(&self) -> UnlockPromoCodeHandler {
        UnlockPromoCodeHandler::new(self.courses.clone())
    }

    pub fn list_tiers_for_course_handler(&self) -> ListTiersForCourseHandler {
        ListTiersForCourseHandler::new(self.courses.clone(), self.tiers.clone())
    }
}
