//! Transaction status state machine.
//!
//! Mirrors the gateway's payment lifecycle. Status only ever moves forward:
//!
//! ```text
//! pending ──► succeeded
//!    │  └───► canceled
//!    └──► waiting_for_capture ──► succeeded
//!                      └────────► canceled
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Status of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Created locally, awaiting the customer and the gateway.
    Pending,

    /// Authorised by the gateway but not yet captured.
    /// Logged only; never touches membership.
    WaitingForCapture,

    /// Money settled. Terminal.
    Succeeded,

    /// Payment abandoned or voided. Terminal.
    Canceled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::WaitingForCapture => "waiting_for_capture",
            TransactionStatus::Succeeded => "succeeded",
            TransactionStatus::Canceled => "canceled",
        }
    }

    /// Position along the lifecycle, used to reason about monotonicity.
    pub fn rank(&self) -> u8 {
        match self {
            TransactionStatus::Pending => 0,
            TransactionStatus::WaitingForCapture => 1,
            TransactionStatus::Succeeded | TransactionStatus::Canceled => 2,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "waiting_for_capture" => Ok(TransactionStatus::WaitingForCapture),
            "succeeded" => Ok(TransactionStatus::Succeeded),
            "canceled" => Ok(TransactionStatus::Canceled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown transaction status '{}'", other),
            )),
        }
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, target),
            (Pending, Succeeded)
                | (Pending, Canceled)
                | (Pending, WaitingForCapture)
                | (WaitingForCapture, Succeeded)
                | (WaitingForCapture, Canceled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Succeeded, Canceled, WaitingForCapture],
            WaitingForCapture => vec![Succeeded, Canceled],
            Succeeded | Canceled => vec![],
        }
    }
}
