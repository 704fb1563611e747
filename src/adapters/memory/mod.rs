//! In-memory adapters for every persistence port.
//!
//! They keep the same uniqueness and compare-and-set guarantees as the
//! Postgres adapters and back the integration tests and `--in-memory` runs.

mod membership_store;
mod platform_store;
mod transaction_store;

pub use membership_store::InMemoryMembershipRepository;
pub use platform_store::InMemoryPlatformStore;
pub use transaction_store::InMemoryTransactionRepository;
