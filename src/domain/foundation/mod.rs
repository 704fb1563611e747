//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the event envelope
//! that form the vocabulary of the billing domain.

mod auth;
mod errors;
mod events;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{EventEnvelope, EventId, EventMetadata};
pub use ids::{CommunityId, CourseId, MembershipId, TierId, TransactionId, UserId};
pub use money::Money;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
