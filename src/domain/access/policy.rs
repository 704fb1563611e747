//! Course access policies.
//!
//! Each course carries an ordered set of policies; any one of them can grant
//! access. Tags are parsed once, at the storage boundary, into a closed enum
//! with typed parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Longest delay a course may configure, in days.
pub const MAX_DELAY_DAYS: i64 = 3650;

/// Stored name of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTag {
    Open,
    PaidSubscription,
    ByRatingLevel,
    Delayed,
    PromoCode,
    Gifted,
}

impl AccessTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTag::Open => "open",
            AccessTag::PaidSubscription => "paid_subscription",
            AccessTag::ByRatingLevel => "by_rating_level",
            AccessTag::Delayed => "delayed",
            AccessTag::PromoCode => "promo_code",
            AccessTag::Gifted => "gifted",
        }
    }
}

impl fmt::Display for AccessTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "open" => Ok(AccessTag::Open),
            "paid_subscription" => Ok(AccessTag::PaidSubscription),
            "by_rating_level" => Ok(AccessTag::ByRatingLevel),
            "delayed" => Ok(AccessTag::Delayed),
            "promo_code" => Ok(AccessTag::PromoCode),
            "gifted" => Ok(AccessTag::Gifted),
            other => Err(ValidationError::invalid_format(
                "access_type",
                format!("unknown access policy '{}'", other),
            )),
        }
    }
}

/// One access rule with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessPolicy {
    /// Anyone may enter.
    Open,

    /// The requester's current tier entitles the course.
    PaidSubscription,

    /// Profile rating at or above `required`.
    RatingGate { required: i32 },

    /// At least `days` whole days since the membership period started.
    Delayed { days: u32 },

    /// Unlocked by entering `code`. Never grants by itself.
    PromoCode { code: String },

    /// Granted to these addresses (stored lower-cased).
    Gifted { emails: Vec<String> },
}

impl AccessPolicy {
    pub fn tag(&self) -> AccessTag {
        match self {
            AccessPolicy::Open => AccessTag::Open,
            AccessPolicy::PaidSubscription => AccessTag::PaidSubscription,
            AccessPolicy::RatingGate { .. } => AccessTag::ByRatingLevel,
            AccessPolicy::Delayed { .. } => AccessTag::Delayed,
            AccessPolicy::PromoCode { .. } => AccessTag::PromoCode,
            AccessPolicy::Gifted { .. } => AccessTag::Gifted,
        }
    }

    /// Builds a gifted policy from the stored comma-separated list.
    pub fn gifted_from_list(list: &str) -> Self {
        let emails = list
            .split(',')
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        AccessPolicy::Gifted { emails }
    }
}

/// Raw per-course parameters as stored next to the tag list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccessParams {
    pub required_rating: Option<i32>,
    pub delay_days: Option<i32>,
    pub promo_code: Option<String>,
    pub gifted_emails: Option<String>,
}

/// Ordered, non-empty set of policies for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAccessConfig {
    policies: Vec<AccessPolicy>,
}

impl CourseAccessConfig {
    /// Builds a config. An empty list becomes `[Open]`; a repeated tag keeps
    /// its first occurrence.
    pub fn new(policies: impl IntoIterator<Item = AccessPolicy>) -> Self {
        let mut unique: Vec<AccessPolicy> = Vec::new();
        for policy in policies {
            if !unique.iter().any(|p| p.tag() == policy.tag()) {
                unique.push(policy);
            }
        }
        if unique.is_empty() {
            unique.push(AccessPolicy::Open);
        }
        Self { policies: unique }
    }

    pub fn open() -> Self {
        Self::new([AccessPolicy::Open])
    }

    /// Parses stored tags plus parameters.
    ///
    /// A tag whose parameter is missing is rejected rather than silently
    /// defaulting to a value that would grant everyone.
    pub fn from_tags<S: AsRef<str>>(
        tags: &[S],
        params: &AccessParams,
    ) -> Result<Self, ValidationError> {
        let mut policies = Vec::with_capacity(tags.len());

        for raw in tags {
            let policy = match raw.as_ref().parse::<AccessTag>()? {
                AccessTag::Open => AccessPolicy::Open,
                AccessTag::PaidSubscription => AccessPolicy::PaidSubscription,
                AccessTag::ByRatingLevel => {
                    let required = params
                        .required_rating
                        .ok_or_else(|| ValidationError::empty_field("required_rating"))?;
                    AccessPolicy::RatingGate { required }
                }
                AccessTag::Delayed => {
                    let days = params
                        .delay_days
                        .ok_or_else(|| ValidationError::empty_field("delay_days"))?;
                    if !(0..=MAX_DELAY_DAYS).contains(&i64::from(days)) {
                        return Err(ValidationError::out_of_range(
                            "delay_days",
                            0,
                            MAX_DELAY_DAYS,
                            i64::from(days),
                        ));
                    }
                    AccessPolicy::Delayed { days: days as u32 }
                }
                AccessTag::PromoCode => {
                    let code = params
                        .promo_code
                        .as_deref()
                        .map(str::trim)
                        .filter(|code| !code.is_empty())
                        .ok_or_else(|| ValidationError::empty_field("promo_code"))?;
                    AccessPolicy::PromoCode {
                        code: code.to_string(),
                    }
                }
                AccessTag::Gifted => {
                    AccessPolicy::gifted_from_list(params.gifted_emails.as_deref().unwrap_or(""))
                }
            };
            policies.push(policy);
        }

        Ok(Self::new(policies))
    }

    pub fn policies(&self) -> &[AccessPolicy] {
        &self.policies
    }

    pub fn tags(&self) -> Vec<AccessTag> {
        self.policies.iter().map(AccessPolicy::tag).collect()
    }

    pub fn has_tag(&self, tag: AccessTag) -> bool {
        self.policies.iter().any(|p| p.tag() == tag)
    }

    /// The configured promo code, if the course has one.
    pub fn promo_code(&self) -> Option<&str> {
        self.policies.iter().find_map(|p| match p {
            AccessPolicy::PromoCode { code } => Some(code.as_str()),
            _ => None,
        })
    }

    /// Returns a copy without the given tag (falls back to `[Open]` if that
    /// empties the set).
    pub fn without(&self, tag: AccessTag) -> Self {
        Self::new(self.policies.iter().filter(|p| p.tag() != tag).cloned())
    }

    /// Returns a copy with `policy` appended unless its tag is present.
    pub fn with(&self, policy: AccessPolicy) -> Self {
        Self::new(self.policies.iter().cloned().chain(std::iter::once(policy)))
    }
}

impl Default for CourseAccessConfig {
    fn default() -> Self {
        Self::open()
    }
}
