//! UnlockPromoCodeHandler - Command handler for promo code entry.

use std::sync::Arc;

use crate::domain::access::promo_code_matches;
use crate::domain::billing::{BillingError, Resource};
use crate::domain::foundation::CourseId;
use crate::ports::CourseReader;

#[derive(Debug, Clone)]
pub struct UnlockPromoCodeCommand {
    pub course_id: CourseId,
    pub promo_input: String,
}

/// Checks a promo code against a course.
///
/// Nothing is stored. On `true` the client adds the course to the unlocked
/// set it sends with access checks.
pub struct UnlockPromoCodeHandler {
    courses: Arc<dyn CourseReader>,
}

impl UnlockPromoCodeHandler {
    pub fn new(courses: Arc<dyn CourseReader>) -> Self {
        Self { courses }
    }

    pub async fn handle(&self, cmd: UnlockPromoCodeCommand) -> Result<bool, BillingError> {
        if cmd.promo_input.trim().is_empty() {
            return Err(BillingError::validation("promoCode", "Promo code is required"));
        }

        let course = self
            .courses
            .find_by_id(&cmd.course_id)
            .await?
            .ok_or_else(|| BillingError::not_found(Resource::Course, cmd.course_id))?;

        let unlocked = course
            .access
            .promo_code()
            .is_some_and(|code| promo_code_matches(code, &cmd.promo_input));

        tracing::info!(course_id = %cmd.course_id, unlocked, "Promo code checked");
        Ok(unlocked)
    }
}
