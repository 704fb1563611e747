//! HandlePaymentWebhookHandler - Command handler for gateway notifications.
//!
//! Notifications are matched to a Transaction by provider payment id, never
//! by anything the client supplied. The status change is a compare-and-set
//! on the status that was read, so of several concurrent deliveries only one
//! renews the membership.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::handlers::membership::{ActivateOrRenewCommand, ActivateOrRenewHandler};
use crate::application::handlers::publish_or_warn;
use crate::domain::billing::{BillingError, PaymentEvent, Resource, TransactionStatus};
use crate::domain::foundation::{StateMachine, Timestamp};
use crate::ports::{EventPublisher, PaymentGateway, PaymentNotification, TransactionRepository};

/// How a notification's claimed status is confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookVerification {
    /// Re-read the payment from the gateway and use its status.
    #[default]
    Fetch,

    /// Use the status in the notification body as-is. Development only.
    Trust,
}

#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    pub notification: PaymentNotification,
}

/// What the webhook did. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Payment succeeded; membership activated or renewed.
    Activated,

    Canceled,

    /// Authorised, awaiting capture. Recorded, membership untouched.
    AwaitingCapture,

    /// The Transaction already had this status.
    AlreadyProcessed,

    /// Not applicable to this Transaction.
    Ignored(String),
}

pub struct HandlePaymentWebhookHandler {
    transactions: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    activate: ActivateOrRenewHandler,
    event_publisher: Arc<dyn EventPublisher>,
    verification: WebhookVerification,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        activate: ActivateOrRenewHandler,
        event_publisher: Arc<dyn EventPublisher>,
        verification: WebhookVerification,
    ) -> Self {
        Self {
            transactions,
            gateway,
            activate,
            event_publisher,
            verification,
        }
    }

    #[tracing::instrument(
        skip_all,
        fields(event = %cmd.notification.event, provider_payment_id = %cmd.notification.payment_id)
    )]
    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, BillingError> {
        let notification = cmd.notification;

        // 1. Find the Transaction this payment belongs to
        let Some(tx) = self
            .transactions
            .find_by_provider_payment_id(&notification.payment_id)
            .await?
        else {
            tracing::warn!("Webhook for unknown payment");
            return Err(BillingError::not_found(
                Resource::Transaction,
                &notification.payment_id,
            ));
        };

        // 2. Decide which status to believe. A terminal Transaction never
        // changes again, so its replays are answered without the gateway.
        let reported = match self.verification {
            _ if tx.status.is_terminal() => notification.status,
            WebhookVerification::Trust => notification.status,
            WebhookVerification::Fetch => {
                let payment = self.gateway.fetch_payment(&notification.payment_id).await?;
                if payment.id != notification.payment_id {
                    return Err(BillingError::upstream(format!(
                        "Gateway returned payment {} for {}",
                        payment.id, notification.payment_id
                    )));
                }
                Some(payment.status)
            }
        };

        let Some(target) = reported else {
            return Ok(WebhookOutcome::Ignored(format!(
                "unsupported event {}",
                notification.event
            )));
        };

        // 3. Idempotency and monotonicity
        if target == tx.status {
            tracing::debug!(transaction_id = %tx.id, status = %target, "Webhook replay");
            return Ok(WebhookOutcome::AlreadyProcessed);
        }
        if !tx.status.can_transition_to(&target) {
            tracing::warn!(
                transaction_id = %tx.id,
                from = %tx.status,
                to = %target,
                "Ignoring backward or terminal status change"
            );
            return Ok(WebhookOutcome::Ignored(format!(
                "cannot move from {} to {}",
                tx.status, target
            )));
        }

        let now = Timestamp::now();
        let won = self
            .transactions
            .transition_status(&tx.id, tx.status, target, now)
            .await?;
        if !won {
            tracing::info!(transaction_id = %tx.id, "Concurrent delivery already applied");
            return Ok(WebhookOutcome::AlreadyProcessed);
        }

        tracing::info!(
            transaction_id = %tx.id,
            from = %tx.status,
            to = %target,
            "Transaction status updated"
        );

        // 4. Effects of the new status
        match target {
            TransactionStatus::Succeeded => {
                let membership = self
                    .activate
                    .handle(ActivateOrRenewCommand {
                        user_id: tx.user_id.clone(),
                        community_id: tx.community_id,
                        tier_id: Some(tx.tier_id),
                        provider_payment_id: Some(notification.payment_id.clone()),
                    })
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            transaction_id = %tx.id,
                            error = %e,
                            "Payment succeeded but membership activation failed"
                        );
                        e
                    })?;

                tracing::info!(
                    transaction_id = %tx.id,
                    membership_id = %membership.id,
                    "Membership activated from payment"
                );
                publish_or_warn(
                    self.event_publisher.as_ref(),
                    PaymentEvent::Succeeded {
                        transaction_id: tx.id,
                        provider_payment_id: notification.payment_id,
                        user_id: tx.user_id,
                        community_id: tx.community_id,
                        occurred_at: now,
                    }
                    .to_envelope(),
                )
                .await;
                Ok(WebhookOutcome::Activated)
            }
            TransactionStatus::Canceled => {
                publish_or_warn(
                    self.event_publisher.as_ref(),
                    PaymentEvent::Canceled {
                        transaction_id: tx.id,
                        provider_payment_id: notification.payment_id,
                        user_id: tx.user_id,
                        occurred_at: now,
                    }
                    .to_envelope(),
                )
                .await;
                Ok(WebhookOutcome::Canceled)
            }
            TransactionStatus::WaitingForCapture => {
                tracing::info!(transaction_id = %tx.id, "Payment awaiting capture");
                Ok(WebhookOutcome::AwaitingCapture)
            }
            TransactionStatus::Pending => Ok(WebhookOutcome::Ignored(
                "pending is not a transition".to_string(),
            )),
        }
    }
}
