//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresTransactionRepository` - payment transactions
//! - `PostgresMembershipRepository` - memberships (upsert and conditional expiry)
//! - `PostgresTierRepository` - subscription tiers
//! - `PostgresPlatformReader` - courses, communities and profiles (read-only)

mod membership_repository;
mod platform_reader;
mod tier_repository;
mod transaction_repository;

pub use membership_repository::PostgresMembershipRepository;
pub use platform_reader::PostgresPlatformReader;
pub use tier_repository::PostgresTierRepository;
pub use transaction_repository::PostgresTransactionRepository;

use std::str::FromStr;

use crate::domain::foundation::DomainError;

fn database_error(context: &str, err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "{}", context);
    DomainError::database(format!("{}: {}", context, err))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Parses a stored enum column.
fn parse_column<T>(column: &str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| DomainError::database(format!("Invalid {} value '{}': {}", column, raw, e)))
}
