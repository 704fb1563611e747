//! Feature flags a subscription tier can carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entitlement flag on a tier.
///
/// Unknown flags are preserved as `Other` so that catalog data written by
/// newer admin tools survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TierFeature {
    /// Every course in the community.
    AllCourses,

    /// Only the courses listed on the tier.
    SelectedCourses,

    /// Access to the members-only chat.
    PrivateChat,

    Other(String),
}

impl TierFeature {
    pub fn as_str(&self) -> &str {
        match self {
            TierFeature::AllCourses => "all_courses",
            TierFeature::SelectedCourses => "selected_courses",
            TierFeature::PrivateChat => "private_chat",
            TierFeature::Other(s) => s,
        }
    }

    /// Parses a stored flag. Accepts the legacy space-separated spelling.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "all_courses" => TierFeature::AllCourses,
            "selected_courses" => TierFeature::SelectedCourses,
            "private_chat" => TierFeature::PrivateChat,
            _ => TierFeature::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for TierFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TierFeature {
    fn from(raw: String) -> Self {
        TierFeature::parse(&raw)
    }
}

impl From<TierFeature> for String {
    fn from(feature: TierFeature) -> Self {
        feature.as_str().to_string()
    }
}
