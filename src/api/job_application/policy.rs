use super::models::{JobApplication, UserId};
use crate::api::error::AppError;

/// What a caller is trying to do with job applications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    ViewAny,
    Create,
    View,
    Update,
    Delete,
}

/// Ownership is the only access dimension: anyone authenticated may list and
/// create, only the owner may touch an individual record.
pub struct JobApplicationPolicy;

impl JobApplicationPolicy {
    /// `target` is the resource for per-record abilities and `None` for class-level ones.
    /// A per-record ability without a target is never allowed.
    pub fn allows(caller: UserId, ability: Ability, target: Option<&JobApplication>) -> bool {
        match ability {
            Ability::ViewAny | Ability::Create => true,
            Ability::View | Ability::Update | Ability::Delete => {
                target.is_some_and(|application| application.user_id == caller)
            }
        }
    }

    pub fn authorize(
        caller: UserId,
        ability: Ability,
        target: Option<&JobApplication>,
    ) -> Result<(), AppError> {
        if Self::allows(caller, ability, target) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}
