//! YooKassa wire types.
//!
//! These mirror the JSON the API sends and accepts. They are mapped to port
//! types at the edge so nothing else depends on the provider's shapes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::billing::TransactionStatus;
use crate::domain::foundation::Money;
use crate::ports::{
    CreatePaymentRequest, GatewayError, GatewayErrorCode, GatewayPayment, PaymentNotification,
};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountWire {
    pub value: String,
    pub currency: String,
}

impl From<&Money> for AmountWire {
    fn from(money: &Money) -> Self {
        Self {
            value: money.to_gateway_value(),
            currency: money.currency().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmationRequestWire {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub return_url: String,
}

/// Body of `POST /payments`.
#[derive(Debug, Serialize)]
pub struct CreatePaymentWire {
    pub amount: AmountWire,
    pub capture: bool,
    pub confirmation: ConfirmationRequestWire,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
}

impl From<&CreatePaymentRequest> for CreatePaymentWire {
    fn from(request: &CreatePaymentRequest) -> Self {
        Self {
            amount: AmountWire::from(&request.amount),
            capture: true,
            confirmation: ConfirmationRequestWire {
                kind: "redirect",
                return_url: request.return_url.clone(),
            },
            description: request.description.clone(),
            metadata: request.metadata.clone(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct ConfirmationWire {
    pub confirmation_url: Option<String>,
}

/// A payment object as returned by the API and embedded in notifications.
#[derive(Debug, Deserialize)]
pub struct PaymentWire {
    pub id: String,
    pub status: String,
    pub amount: AmountWire,
    pub confirmation: Option<ConfirmationWire>,
}

impl PaymentWire {
    pub fn into_gateway_payment(self) -> Result<GatewayPayment, GatewayError> {
        let status = self.status.parse::<TransactionStatus>().map_err(|_| {
            GatewayError::invalid_response(format!("Unknown payment status '{}'", self.status))
        })?;
        let amount = Money::from_gateway_value(&self.amount.value, &self.amount.currency)
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;

        Ok(GatewayPayment {
            id: self.id,
            status,
            confirmation_url: self.confirmation.and_then(|c| c.confirmation_url),
            amount,
        })
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorWire {
    pub code: Option<String>,
    pub description: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Notifications
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct NotificationObjectWire {
    id: String,
    status: Option<String>,
    /// Present on refund objects.
    payment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotificationWire {
    #[serde(rename = "type")]
    kind: String,
    event: String,
    object: NotificationObjectWire,
}

/// Parses a webhook body.
///
/// Only `payment.*` events carry a payment status. Other events (refunds,
/// payouts) are mapped to their payment id with no status so the handler
/// acknowledges them without acting.
pub fn parse_notification(body: &[u8]) -> Result<PaymentNotification, GatewayError> {
    let wire: NotificationWire = serde_json::from_slice(body).map_err(|e| {
        GatewayError::new(
            GatewayErrorCode::InvalidRequest,
            format!("Malformed notification: {}", e),
        )
    })?;

    if wire.kind != "notification" {
        return Err(GatewayError::new(
            GatewayErrorCode::InvalidRequest,
            format!("Unexpected envelope type '{}'", wire.kind),
        ));
    }

    let is_payment_event = wire.event.starts_with("payment.");
    let payment_id = if is_payment_event {
        wire.object.id
    } else {
        wire.object.payment_id.unwrap_or(wire.object.id)
    };
    if payment_id.trim().is_empty() {
        return Err(GatewayError::new(
            GatewayErrorCode::InvalidRequest,
            "Notification has no payment id",
        ));
    }

    let status = if is_payment_event {
        wire.object
            .status
            .as_deref()
            .and_then(|s| s.parse::<TransactionStatus>().ok())
    } else {
        None
    };

    Ok(PaymentNotification {
        event: wire.event,
        payment_id,
        status,
    })
}
