//! Course access control.
//!
//! - `policy` - AccessPolicy enum and per-course configuration
//! - `course` - Course and AccessSubject
//! - `evaluator` - the `has_access` decision

mod course;
mod evaluator;
mod policy;

pub use course::{AccessSubject, Course};
pub use evaluator::{has_access, promo_code_matches, AccessDecision, GrantReason};
pub use policy::{AccessParams, AccessPolicy, AccessTag, CourseAccessConfig, MAX_DELAY_DAYS};
