//! Membership status state machine.
//!
//! Memberships are never deleted. They move between standing states and a
//! renewal reactivates whatever state the row was in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Standing of a user in a community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Paid or free standing; access per tier.
    Active,

    /// Ended by the user or an admin.
    Canceled,

    /// `expires_at` passed. Set lazily on read.
    Expired,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Canceled => "canceled",
            MembershipStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MembershipStatus::Active),
            "canceled" | "cancelled" => Ok(MembershipStatus::Canceled),
            "expired" => Ok(MembershipStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown membership status '{}'", other),
            )),
        }
    }
}

impl StateMachine for MembershipStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MembershipStatus::*;
        matches!(
            (self, target),
            (Active, Active) // Renewal
                | (Active, Canceled)
                | (Active, Expired)
                | (Canceled, Active)
                | (Canceled, Expired)
                | (Expired, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MembershipStatus::*;
        match self {
            Active => vec![Active, Canceled, Expired],
            Canceled => vec![Active, Expired],
            Expired => vec![Active],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_can_be_reactivated() {
        for status in [
            MembershipStatus::Active,
            MembershipStatus::Canceled,
            MembershipStatus::Expired,
        ] {
            assert!(status.can_transition_to(&MembershipStatus::Active));
        }
    }

    #[test]
    fn expired_cannot_be_canceled() {
        assert!(MembershipStatus::Expired
            .transition_to(MembershipStatus::Canceled)
            .is_err());
    }

    #[test]
    fn no_state_is_terminal() {
        assert!(!MembershipStatus::Expired.is_terminal());
        assert!(!MembershipStatus::Canceled.is_terminal());
    }

    #[test]
    fn parses_both_spellings_of_canceled() {
        assert_eq!("canceled".parse::<MembershipStatus>().unwrap(), MembershipStatus::Canceled);
        assert_eq!("cancelled".parse::<MembershipStatus>().unwrap(), MembershipStatus::Canceled);
        assert!("paused".parse::<MembershipStatus>().is_err());
    }
}
