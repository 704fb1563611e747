//! Membership handlers.
//!
//! ## Commands
//! - Activating or renewing after a successful payment
//! - Joining a free tier
//!
//! ## Queries
//! - Active membership lookup (with lazy expiry)
//! - Membership listing with derived flags

mod activate_or_renew;
mod get_active_membership;
mod join_free_tier;
mod list_memberships;

// Commands
pub use activate_or_renew::{ActivateOrRenewCommand, ActivateOrRenewHandler};
pub use join_free_tier::{JoinFreeTierCommand, JoinFreeTierHandler};

// Queries
pub use get_active_membership::{GetActiveMembershipHandler, GetActiveMembershipQuery};
pub use list_memberships::{ListMembershipsHandler, ListMembershipsQuery};
