//! Transaction repository port.
//!
//! Transactions are written once as `pending` and then only move forward.
//! Status updates are compare-and-set so that duplicate webhook deliveries
//! racing each other produce exactly one winner.

use async_trait::async_trait;

use crate::domain::billing::{Transaction, TransactionStatus};
use crate::domain::foundation::{DomainError, Timestamp, TransactionId};

/// Repository port for payment transactions.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Insert a new transaction.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the idempotency key is already stored
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Record the gateway's payment id. Only succeeds while no id is set.
    ///
    /// # Errors
    ///
    /// - `TransactionNotFound` if the row is missing
    /// - `Conflict` if a provider payment id was already attached
    async fn attach_provider_payment_id(
        &self,
        id: &TransactionId,
        provider_payment_id: &str,
        now: Timestamp,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError>;

    /// Lookup used by the webhook.
    async fn find_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Transaction>, DomainError>;

    /// Move `id` from `expected` to `next`.
    ///
    /// Returns `false` when the stored status was no longer `expected`
    /// (another writer got there first).
    async fn transition_status(
        &self,
        id: &TransactionId,
        expected: TransactionStatus,
        next: TransactionStatus,
        now: Timestamp,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn TransactionRepository) {}
    }
}
