//! Review records and the payloads used to create and edit them.

use crate::error::{Error, Result};
use crate::types::{Rating, ReviewId, TourId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's rating and comment on one tour.
///
/// `tour` and `user` are fixed at creation; only `body` and `rating` can
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review id
    pub id: ReviewId,
    /// Review text
    #[serde(rename = "review")]
    pub body: String,
    /// Star rating
    pub rating: Rating,
    /// Reviewed tour
    pub tour: TourId,
    /// Author
    pub user: UserId,
    /// Insertion time
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Build a review from a validated payload.
    #[must_use]
    pub fn new(tour: TourId, user: UserId, input: NewReview, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ReviewId::new(),
            body: input.body.trim().to_string(),
            rating: input.rating,
            tour,
            user,
            created_at,
        }
    }

    /// Apply an edit in place.
    pub fn apply(&mut self, patch: &ReviewPatch) {
        if let Some(body) = &patch.body {
            self.body = body.trim().to_string();
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}

/// Request body for a new review. Tour and author come from the route and
/// the bearer token, never from the body.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewReview {
    /// Review text
    #[serde(rename = "review")]
    pub body: String,
    /// Star rating
    pub rating: Rating,
}

impl NewReview {
    /// Reject empty bodies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body is blank.
    pub fn validate(&self) -> Result<()> {
        validate_body(&self.body)
    }
}

/// Partial update of a review. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewPatch {
    /// New review text
    #[serde(default, rename = "review")]
    pub body: Option<String>,
    /// New star rating
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl ReviewPatch {
    /// Reject blank replacement bodies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a body is present but blank.
    pub fn validate(&self) -> Result<()> {
        match &self.body {
            Some(body) => validate_body(body),
            None => Ok(()),
        }
    }
}

/// Review listing filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    /// Only reviews of this tour
    pub tour: Option<TourId>,
}

impl ReviewFilter {
    /// Reviews of a single tour.
    #[must_use]
    pub const fn for_tour(tour: TourId) -> Self {
        Self { tour: Some(tour) }
    }

    /// Whether `review` passes the filter.
    #[must_use]
    pub fn matches(&self, review: &Review) -> bool {
        self.tour.is_none_or(|tour| review.tour == tour)
    }
}

fn validate_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(Error::validation("review can not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stars(value: u8) -> Rating {
        Rating::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_blank_body_rejected() {
        let input = NewReview {
            body: "   ".into(),
            rating: stars(4),
        };
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let mut review = Review::new(
            TourId::new(),
            UserId::new(),
            NewReview {
                body: " Lovely hike ".into(),
                rating: stars(5),
            },
            Utc::now(),
        );
        assert_eq!(review.body, "Lovely hike");

        review.apply(&ReviewPatch {
            body: None,
            rating: Some(stars(2)),
        });
        assert_eq!(review.body, "Lovely hike");
        assert_eq!(review.rating, stars(2));
    }

    #[test]
    fn test_new_review_json_shape() {
        let input: NewReview =
            serde_json::from_str(r#"{"review":"Great","rating":5}"#).unwrap_or_else(|_| unreachable!());
        assert_eq!(input.body, "Great");
        assert!(serde_json::from_str::<NewReview>(r#"{"review":"Great","rating":0}"#).is_err());
    }

    #[test]
    fn test_filter_matches_tour() {
        let tour = TourId::new();
        let review = Review::new(
            tour,
            UserId::new(),
            NewReview {
                body: "ok".into(),
                rating: stars(3),
            },
            Utc::now(),
        );
        assert!(ReviewFilter::default().matches(&review));
        assert!(ReviewFilter::for_tour(tour).matches(&review));
        assert!(!ReviewFilter::for_tour(TourId::new()).matches(&review));
    }
}
