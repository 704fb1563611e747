//! CreateSubscriptionPaymentHandler - Command handler for paid checkout.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::handlers::publish_or_warn;
use crate::domain::billing::{BillingError, PaymentEvent, Resource, Transaction};
use crate::domain::foundation::{CommunityId, TierId, Timestamp, TransactionId, UserId};
use crate::ports::{
    CommunityReader, CreatePaymentRequest, EventPublisher, PaymentGateway, TierRepository,
    TransactionRepository,
};

/// Settings the checkout flow needs from configuration.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Used to build the default return URL.
    pub frontend_base_url: String,
}

impl CheckoutSettings {
    pub fn new(frontend_base_url: impl Into<String>) -> Self {
        Self {
            frontend_base_url: frontend_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn default_return_url(&self, community_id: &CommunityId) -> String {
        format!(
            "{}/communities/{}?payment=success",
            self.frontend_base_url, community_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct CreateSubscriptionPaymentCommand {
    pub user_id: UserId,
    pub community_id: CommunityId,
    pub tier_id: TierId,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubscriptionPaymentResult {
    pub confirmation_url: String,
    pub transaction_id: TransactionId,
    pub payment_id: String,
}

/// Starts a paid subscription.
///
/// The pending Transaction is written before the gateway is called, so a
/// gateway failure leaves a `pending` row behind and the caller retries with
/// a fresh Transaction and idempotency key.
pub struct CreateSubscriptionPaymentHandler {
    tiers: Arc<dyn TierRepository>,
    communities: Arc<dyn CommunityReader>,
    transactions: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    event_publisher: Arc<dyn EventPublisher>,
    settings: CheckoutSettings,
}

impl CreateSubscriptionPaymentHandler {
    pub fn new(
        tiers: Arc<dyn TierRepository>,
        communities: Arc<dyn CommunityReader>,
        transactions: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        event_publisher: Arc<dyn EventPublisher>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            tiers,
            communities,
            transactions,
            gateway,
            event_publisher,
            settings,
        }
    }

    #[tracing::instrument(skip_all, fields(user_id = %cmd.user_id, tier_id = %cmd.tier_id))]
    pub async fn handle(
        &self,
        cmd: CreateSubscriptionPaymentCommand,
    ) -> Result<CreateSubscriptionPaymentResult, BillingError> {
        // 1. Tier and community must exist; a tier of another community counts as missing
        let tier = self
            .tiers
            .find_by_id(&cmd.tier_id)
            .await?
            .filter(|t| t.community_id == cmd.community_id)
            .ok_or_else(|| BillingError::not_found(Resource::Tier, cmd.tier_id))?;

        let community = self
            .communities
            .find_by_id(&cmd.community_id)
            .await?
            .ok_or_else(|| BillingError::not_found(Resource::Community, cmd.community_id))?;

        if !tier.is_active {
            return Err(BillingError::invalid_state("Subscription tier is not active"));
        }
        if tier.is_free {
            return Err(BillingError::invalid_state(
                "Subscription tier is free; join it via free-membership",
            ));
        }
        if let Some(url) = tier.direct_payment_url() {
            return Err(BillingError::invalid_state(format!(
                "Subscription tier is sold through its own checkout at {}",
                url
            )));
        }

        // 2. Persist the attempt before anything leaves the process
        let now = Timestamp::now();
        let transaction = Transaction::create_pending(
            cmd.user_id,
            cmd.community_id,
            tier.id,
            tier.monthly_price.clone(),
            format!("Подписка «{}» в сообществе {}", tier.name, community.name),
            now,
        );
        self.transactions.insert(&transaction).await?;

        publish_or_warn(
            self.event_publisher.as_ref(),
            PaymentEvent::TransactionCreated {
                transaction_id: transaction.id,
                user_id: transaction.user_id.clone(),
                community_id: transaction.community_id,
                tier_id: transaction.tier_id,
                amount_minor: transaction.amount.amount_minor(),
                currency: transaction.amount.currency().to_string(),
                occurred_at: now,
            }
            .to_envelope(),
        )
        .await;

        // 3. Ask the gateway for a payment under this attempt's key
        let return_url = cmd
            .return_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_return_url(&transaction.community_id));

        let metadata = BTreeMap::from([
            ("transaction_id".to_string(), transaction.id.to_string()),
            ("user_id".to_string(), transaction.user_id.to_string()),
            ("community_id".to_string(), transaction.community_id.to_string()),
            ("tier_id".to_string(), transaction.tier_id.to_string()),
        ]);

        let payment = self
            .gateway
            .create_payment(CreatePaymentRequest {
                amount: transaction.amount.clone(),
                description: transaction.description.clone(),
                return_url,
                idempotency_key: transaction.idempotency_key.clone(),
                metadata,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    transaction_id = %transaction.id,
                    error = %e,
                    retryable = e.retryable,
                    "Gateway rejected payment creation; transaction left pending"
                );
                BillingError::from(e)
            })?;

        // 4. Bind the gateway's id to the attempt
        self.transactions
            .attach_provider_payment_id(&transaction.id, &payment.id, Timestamp::now())
            .await?;

        let confirmation_url = payment.confirmation_url.ok_or_else(|| {
            tracing::error!(
                transaction_id = %transaction.id,
                provider_payment_id = %payment.id,
                "Gateway returned no confirmation URL"
            );
            BillingError::upstream("Payment has no confirmation URL")
        })?;

        tracing::info!(
            transaction_id = %transaction.id,
            provider_payment_id = %payment.id,
            "Subscription payment created"
        );

        Ok(CreateSubscriptionPaymentResult {
            confirmation_url,
            transaction_id: transaction.id,
            payment_id: payment.id,
        })
    }
}
