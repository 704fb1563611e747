//! Membership domain module.
//!
//! A user's paid or free standing in a community: activation, renewal and
//! lazy expiry.
//!
//! # Module Structure
//!
//! - `aggregate` - Membership aggregate, activation values, renewal period
//! - `status` - MembershipStatus state machine
//! - `events` - Membership domain events
//! - `view` - Read projection with derived flags

mod aggregate;
mod events;
mod status;
mod view;

pub use aggregate::{Membership, MembershipActivation, RenewalPeriod};
pub use events::MembershipEvent;
pub use status::MembershipStatus;
pub use view::MembershipView;
