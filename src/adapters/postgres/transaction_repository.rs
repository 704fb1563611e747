//! PostgreSQL implementation of TransactionRepository.
//!
//! Status updates are compare-and-set on the status that was read, so two
//! concurrent webhook deliveries cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{IdempotencyKey, Transaction, TransactionStatus};
use crate::domain::foundation::{
    CommunityId, DomainError, ErrorCode, Money, TierId, Timestamp, TransactionId, UserId,
};
use crate::ports::TransactionRepository;

use super::{database_error, is_unique_violation, parse_column};

pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: String,
    community_id: Uuid,
    subscription_tier_id: Uuid,
    amount_minor: i64,
    currency: String,
    status: String,
    provider: String,
    provider_payment_id: Option<String>,
    idempotency_key: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            user_id: UserId::new(row.user_id)
                .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?,
            community_id: CommunityId::from_uuid(row.community_id),
            tier_id: TierId::from_uuid(row.subscription_tier_id),
            amount: Money::new(row.amount_minor, &row.currency)
                .map_err(|e| DomainError::database(format!("Invalid amount: {}", e)))?,
            status: parse_column::<TransactionStatus>("status", &row.status)?,
            provider: row.provider,
            provider_payment_id: row.provider_payment_id,
            idempotency_key: IdempotencyKey::from_stored(row.idempotency_key)
                .map_err(|e| DomainError::database(format!("Invalid idempotency_key: {}", e)))?,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, community_id, subscription_tier_id, amount_minor, currency,
           status, provider, provider_payment_id, idempotency_key, description,
           created_at, updated_at
    FROM transactions
"#;

fn not_found(id: &TransactionId) -> DomainError {
    DomainError::new(
        ErrorCode::TransactionNotFound,
        format!("Transaction not found: {}", id),
    )
    .with_detail("id", id.to_string())
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, community_id, subscription_tier_id, amount_minor, currency,
                status, provider, provider_payment_id, idempotency_key, description,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.user_id.as_str())
        .bind(transaction.community_id.as_uuid())
        .bind(transaction.tier_id.as_uuid())
        .bind(transaction.amount.amount_minor())
        .bind(transaction.amount.currency())
        .bind(transaction.status.as_str())
        .bind(&transaction.provider)
        .bind(&transaction.provider_payment_id)
        .bind(transaction.idempotency_key.as_str())
        .bind(&transaction.description)
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return DomainError::new(
                    ErrorCode::Conflict,
                    "Transaction with this idempotency key already exists",
                );
            }
            database_error("Failed to insert transaction", e)
        })?;

        Ok(())
    }

    async fn attach_provider_payment_id(
        &self,
        id: &TransactionId,
        provider_payment_id: &str,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET provider_payment_id = $2, updated_at = $3
            WHERE id = $1 AND provider_payment_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(provider_payment_id)
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return DomainError::new(
                    ErrorCode::Conflict,
                    format!("Payment {} is bound to another transaction", provider_payment_id),
                );
            }
            database_error("Failed to attach provider payment id", e)
        })?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Already attached: fine only if it is the same id.
        match self.find_by_id(id).await? {
            None => Err(not_found(id)),
            Some(existing)
                if existing.provider_payment_id.as_deref() == Some(provider_payment_id) =>
            {
                Ok(())
            }
            Some(_) => Err(DomainError::new(
                ErrorCode::Conflict,
                "Transaction already has a provider payment id",
            )),
        }
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to load transaction", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{} WHERE provider_payment_id = $1", SELECT_COLUMNS))
                .bind(provider_payment_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("Failed to load transaction", e))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn transition_status(
        &self,
        id: &TransactionId,
        expected: TransactionStatus,
        next: TransactionStatus,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to update transaction status", e))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Lost the race, or the row is gone.
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM transactions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to load transaction", e))?;

        match exists {
            Some(_) => Ok(false),
            None => Err(not_found(id)),
        }
    }
}
