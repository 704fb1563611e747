//! Billing error taxonomy.
//!
//! Shared by the payment, membership and access handlers.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | InvalidState | 400 |
//! | Validation | 400 |
//! | Unauthenticated | 401 |
//! | Upstream | 500 (generic body) |
//! | Infrastructure | 500 |

use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// What was missing in a `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Transaction,
    Membership,
    Tier,
    Community,
    Course,
}

impl Resource {
    fn as_str(&self) -> &'static str {
        match self {
            Resource::Transaction => "Transaction",
            Resource::Membership => "Membership",
            Resource::Tier => "Subscription tier",
            Resource::Community => "Community",
            Resource::Course => "Course",
        }
    }
}

/// Errors surfaced by billing and access operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// A referenced record does not exist.
    NotFound { resource: Resource, id: String },

    /// The operation is not allowed in the current state (inactive tier,
    /// malformed webhook body, non-free tier for free opt-in).
    InvalidState(String),

    /// Caller input failed validation.
    Validation { field: String, message: String },

    /// The payment gateway was unreachable or answered non-2xx.
    /// The message is for logs only.
    Upstream(String),

    /// No authenticated user on the request.
    Unauthenticated,

    /// Storage or other infrastructure failure.
    Infrastructure(String),
}

impl BillingError {
    pub fn not_found(resource: Resource, id: impl ToString) -> Self {
        BillingError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        BillingError::InvalidState(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        BillingError::Upstream(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::NotFound { resource, .. } => match resource {
                Resource::Transaction => ErrorCode::TransactionNotFound,
                Resource::Membership => ErrorCode::MembershipNotFound,
                Resource::Tier => ErrorCode::TierNotFound,
                Resource::Community => ErrorCode::CommunityNotFound,
                Resource::Course => ErrorCode::CourseNotFound,
            },
            BillingError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            BillingError::Validation { .. } => ErrorCode::ValidationFailed,
            BillingError::Upstream(_) => ErrorCode::PaymentGatewayError,
            BillingError::Unauthenticated => ErrorCode::Unauthorized,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a message describing the error.
    pub fn message(&self) -> String {
        match self {
            BillingError::NotFound { resource, id } => {
                format!("{} not found: {}", resource.as_str(), id)
            }
            BillingError::InvalidState(msg) => msg.clone(),
            BillingError::Validation { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BillingError::Upstream(msg) => format!("Payment gateway error: {}", msg),
            BillingError::Unauthenticated => "Authentication required".to_string(),
            BillingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl fmt::Display for BillingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        let id = err.details.get("id").cloned().unwrap_or_default();
        match err.code {
            ErrorCode::TransactionNotFound => BillingError::not_found(Resource::Transaction, id),
            ErrorCode::MembershipNotFound => BillingError::not_found(Resource::Membership, id),
            ErrorCode::TierNotFound => BillingError::not_found(Resource::Tier, id),
            ErrorCode::CommunityNotFound => BillingError::not_found(Resource::Community, id),
            ErrorCode::CourseNotFound => BillingError::not_found(Resource::Course, id),
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => {
                let field = err.details.get("field").cloned().unwrap_or_default();
                BillingError::validation(field, err.message)
            }
            ErrorCode::InvalidStateTransition | ErrorCode::TierInactive | ErrorCode::Conflict => {
                BillingError::InvalidState(err.message)
            }
            ErrorCode::PaymentGatewayError => BillingError::Upstream(err.message),
            ErrorCode::Unauthorized | ErrorCode::Forbidden => BillingError::Unauthenticated,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                BillingError::Infrastructure(err.message)
            }
        }
    }
}

impl From<ValidationError> for BillingError {
    fn from(err: ValidationError) -> Self {
        BillingError::validation(err.field().to_string(), err.to_string())
    }
}
