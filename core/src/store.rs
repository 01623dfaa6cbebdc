//! Storage abstractions for reviews and tours.
//!
//! Implementations live in `natours-testing` (in-memory) and
//! `natours-postgres` (`PostgreSQL`). Both must translate backend failures
//! into [`Error::StoreUnavailable`](crate::Error::StoreUnavailable) and
//! unique-key violations into the matching domain error.
//!
//! # Example
//!
//! ```ignore
//! let review = Review::new(tour_id, user_id, input, clock.now());
//! reviews.create(&review).await?;
//!
//! let summary = reviews.ratings_summary(tour_id).await?;
//! tours.set_ratings(tour_id, TourRatings::from_summary(summary)).await?;
//! ```

use crate::error::Result;
use crate::query::TourQuery;
use crate::ratings::{RatingsSummary, TourRatings};
use crate::review::{Review, ReviewFilter, ReviewPatch};
use crate::tour::{Tour, TourPatch};
use crate::types::{ReviewId, TourId};
use std::future::Future;

/// Persisted collection of reviews.
///
/// Owns the one-review-per-user-per-tour constraint.
pub trait ReviewStore: Send + Sync {
    /// Insert a new review.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateReview`](crate::Error::DuplicateReview) if
    /// the author already reviewed this tour, or
    /// [`Error::StoreUnavailable`](crate::Error::StoreUnavailable).
    fn create(&self, review: &Review) -> impl Future<Output = Result<Review>> + Send;

    /// Look a review up by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure. A missing review is `Ok(None)`.
    fn find_by_id(&self, id: ReviewId) -> impl Future<Output = Result<Option<Review>>> + Send;

    /// Apply `patch` and return the updated review, or `None` if no review
    /// has this id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn update(
        &self,
        id: ReviewId,
        patch: &ReviewPatch,
    ) -> impl Future<Output = Result<Option<Review>>> + Send;

    /// Remove a review. Returns `false` if no review had this id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn delete(&self, id: ReviewId) -> impl Future<Output = Result<bool>> + Send;

    /// Reviews passing `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn list(&self, filter: ReviewFilter) -> impl Future<Output = Result<Vec<Review>>> + Send;

    /// Count and mean rating of every review of `tour`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn ratings_summary(&self, tour: TourId)
    -> impl Future<Output = Result<RatingsSummary>> + Send;
}

/// Persisted collection of tours.
pub trait TourStore: Send + Sync {
    /// Insert a new tour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`](crate::Error::Conflict) if the name is
    /// taken, or [`Error::StoreUnavailable`](crate::Error::StoreUnavailable).
    fn create(&self, tour: &Tour) -> impl Future<Output = Result<Tour>> + Send;

    /// Look a tour up by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn find_by_id(&self, id: TourId) -> impl Future<Output = Result<Option<Tour>>> + Send;

    /// Look a tour up by slug.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn find_by_slug(&self, slug: &str) -> impl Future<Output = Result<Option<Tour>>> + Send;

    /// Non-secret tours matching `query`, sorted and paginated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn list(&self, query: &TourQuery) -> impl Future<Output = Result<Vec<Tour>>> + Send;

    /// Every tour, secret ones included, in no particular order. Used by
    /// the reporting aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Tour>>> + Send;

    /// Apply a user-facing edit. Returns `None` if no tour has this id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if the edited
    /// tour is invalid, [`Error::Conflict`](crate::Error::Conflict) on a
    /// name clash, or [`Error::StoreUnavailable`](crate::Error::StoreUnavailable).
    fn update(
        &self,
        id: TourId,
        patch: &TourPatch,
    ) -> impl Future<Output = Result<Option<Tour>>> + Send;

    /// Remove a tour. Returns `false` if no tour had this id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn delete(&self, id: TourId) -> impl Future<Output = Result<bool>> + Send;

    /// Overwrite the derived rating fields. A missing tour is a no-op, not
    /// an error, and never creates a tour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable)
    /// on backend failure.
    fn set_ratings(
        &self,
        id: TourId,
        ratings: TourRatings,
    ) -> impl Future<Output = Result<()>> + Send;
}
