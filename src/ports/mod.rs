//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `TransactionRepository` - Payment transactions with compare-and-set status updates
//! - `MembershipRepository` - Membership upsert and conditional expiry
//! - `TierRepository` - Subscription tiers per community
//!
//! ## Platform Readers
//!
//! Courses, communities and profiles are owned by the wider platform; this
//! service only reads them.
//!
//! - `CourseReader`, `CommunityReader`, `ProfileReader`
//!
//! ## External Services
//!
//! - `PaymentGateway` - Hosted payment provider
//! - `SessionValidator` - Access token validation
//! - `EventPublisher` - Domain event change feed

mod community_reader;
mod course_reader;
mod event_publisher;
mod membership_repository;
mod payment_gateway;
mod profile_reader;
mod session_validator;
mod tier_repository;
mod transaction_repository;

pub use community_reader::{Community, CommunityReader};
pub use course_reader::CourseReader;
pub use event_publisher::EventPublisher;
pub use membership_repository::{MembershipRepository, UpsertOutcome};
pub use payment_gateway::{
    CreatePaymentRequest, GatewayError, GatewayErrorCode, GatewayPayment, PaymentGateway,
    PaymentNotification,
};
pub use profile_reader::{ProfileReader, UserProfile};
pub use session_validator::SessionValidator;
pub use tier_repository::TierRepository;
pub use transaction_repository::TransactionRepository;
