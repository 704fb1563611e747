//! Access handlers.
//!
//! ## Commands
//! - Promo code entry
//!
//! ## Queries
//! - Course access decision
//! - Tiers that unlock a course

mod check_course_access;
mod list_tiers_for_course;
mod unlock_promo_code;

// Commands
pub use unlock_promo_code::{UnlockPromoCodeCommand, UnlockPromoCodeHandler};

// Queries
pub use check_course_access::{CheckCourseAccessHandler, CheckCourseAccessQuery};
pub use list_tiers_for_course::{ListTiersForCourseHandler, ListTiersForCourseQuery, TiersForCourse};
