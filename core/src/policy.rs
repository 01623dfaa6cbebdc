//! Authorization rules.
//!
//! Identity comes from the authentication layer; these checks only decide
//! whether an already-identified [`Actor`] may perform an operation.

use crate::error::{Error, Result};
use crate::review::Review;
use crate::types::{Actor, Role};

/// Roles allowed to create, edit and delete tours.
pub const TOUR_MANAGERS: &[Role] = &[Role::Admin, Role::LeadGuide];

/// Roles allowed to read the monthly plan.
pub const TOUR_STAFF: &[Role] = &[Role::Admin, Role::LeadGuide, Role::Guide];

/// Roles allowed to write reviews.
pub const REVIEWERS: &[Role] = &[Role::User];

/// Require the actor to hold one of `allowed`.
///
/// # Errors
///
/// Returns [`Error::Forbidden`] otherwise.
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "role {} may not perform this action",
            actor.role
        )))
    }
}

/// Only the author of a review or an administrator may change or remove it.
///
/// # Errors
///
/// Returns [`Error::Forbidden`] otherwise.
pub fn authorize_review_mutation(actor: &Actor, review: &Review) -> Result<()> {
    if actor.is_admin() || actor.user_id == review.user {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "only the author or an administrator may modify this review".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::NewReview;
    use crate::types::{Rating, TourId, UserId};
    use chrono::Utc;

    fn review_by(user: UserId) -> Review {
        Review::new(
            TourId::new(),
            user,
            NewReview {
                body: "Nice".into(),
                rating: Rating::new(4).unwrap_or_else(|_| unreachable!()),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_author_and_admin_may_mutate() {
        let author = UserId::new();
        let review = review_by(author);

        assert!(authorize_review_mutation(&Actor::new(author, Role::User), &review).is_ok());
        assert!(authorize_review_mutation(&Actor::new(UserId::new(), Role::Admin), &review).is_ok());
        assert!(matches!(
            authorize_review_mutation(&Actor::new(UserId::new(), Role::LeadGuide), &review),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_role() {
        let guide = Actor::new(UserId::new(), Role::Guide);
        assert!(require_role(&guide, TOUR_STAFF).is_ok());
        assert!(require_role(&guide, TOUR_MANAGERS).is_err());
        assert!(require_role(&guide, REVIEWERS).is_err());
    }
}
