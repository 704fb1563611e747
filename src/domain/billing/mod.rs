//! Billing domain module.
//!
//! Tracks payment attempts from creation through gateway settlement.
//!
//! # Module Structure
//!
//! - `transaction` - Transaction aggregate
//! - `status` - TransactionStatus state machine
//! - `idempotency` - Gateway idempotency key derivation
//! - `events` - Payment domain events
//! - `errors` - Error taxonomy shared by all handlers

mod errors;
mod events;
mod idempotency;
mod status;
mod transaction;

pub use errors::{BillingError, Resource};
pub use events::PaymentEvent;
pub use idempotency::{IdempotencyKey, MAX_IDEMPOTENCY_KEY_LEN};
pub use status::TransactionStatus;
pub use transaction::{StatusChange, Transaction, MAX_DESCRIPTION_CHARS, YOOKASSA_PROVIDER};
