//! In-memory transaction repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::billing::{Transaction, TransactionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, TransactionId};
use crate::ports::TransactionRepository;

/// Transactions held in a map, with the same uniqueness and
/// compare-and-set rules as the Postgres schema.
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    rows: RwLock<HashMap<TransactionId, Transaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored transaction.
    pub async fn all(&self) -> Vec<Transaction> {
        self.rows.read().await.values().cloned().collect()
    }
}

fn not_found(id: &TransactionId) -> DomainError {
    DomainError::new(
        ErrorCode::TransactionNotFound,
        format!("Transaction not found: {}", id),
    )
    .with_detail("id", id.to_string())
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;

        let duplicate_key = rows
            .values()
            .any(|t| t.idempotency_key == transaction.idempotency_key);
        if duplicate_key || rows.contains_key(&transaction.id) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Transaction with this idempotency key already exists",
            ));
        }

        rows.insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn attach_provider_payment_id(
        &self,
        id: &TransactionId,
        provider_payment_id: &str,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;

        let taken = rows.values().any(|t| {
            t.id != *id && t.provider_payment_id.as_deref() == Some(provider_payment_id)
        });
        if taken {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Payment {} is bound to another transaction", provider_payment_id),
            ));
        }

        let row = rows.get_mut(id).ok_or_else(|| not_found(id))?;
        row.attach_provider_payment_id(provider_payment_id, now)
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|t| t.provider_payment_id.as_deref() == Some(provider_payment_id))
            .cloned())
    }

    async fn transition_status(
        &self,
        id: &TransactionId,
        expected: TransactionStatus,
        next: TransactionStatus,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(id).ok_or_else(|| not_found(id))?;

        if row.status != expected {
            return Ok(false);
        }
        row.status = next;
        row.updated_at = now;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CommunityId, Money, TierId, UserId};

    fn pending() -> Transaction {
        Transaction::create_pending(
            UserId::new("user-1").unwrap(),
            CommunityId::new(),
            TierId::new(),
            Money::new(99000, "RUB").unwrap(),
            "Подписка",
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn duplicate_idempotency_key_is_a_conflict() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.insert(&tx).await.unwrap();

        let mut copy = tx.clone();
        copy.id = TransactionId::new();
        let err = repo.insert(&copy).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn provider_payment_id_is_set_once() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.insert(&tx).await.unwrap();

        repo.attach_provider_payment_id(&tx.id, "pay_1", Timestamp::now())
            .await
            .unwrap();
        let err = repo
            .attach_provider_payment_id(&tx.id, "pay_2", Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        let found = repo.find_by_provider_payment_id("pay_1").await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(tx.id));
    }

    #[tokio::test]
    async fn transition_is_compare_and_set() {
        let repo = InMemoryTransactionRepository::new();
        let tx = pending();
        repo.insert(&tx).await.unwrap();

        let first = repo
            .transition_status(
                &tx.id,
                TransactionStatus::Pending,
                TransactionStatus::Succeeded,
                Timestamp::now(),
            )
            .await
            .unwrap();
        let second = repo
            .transition_status(
                &tx.id,
                TransactionStatus::Pending,
                TransactionStatus::Succeeded,
                Timestamp::now(),
            )
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn transition_on_missing_row_is_not_found() {
        let repo = InMemoryTransactionRepository::new();
        let err = repo
            .transition_status(
                &TransactionId::new(),
                TransactionStatus::Pending,
                TransactionStatus::Canceled,
                Timestamp::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionNotFound);
    }
}
