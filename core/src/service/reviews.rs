//! Review operations and the rating consistency trigger.
//!
//! Every review mutation ends with a recomputation of the affected tour's
//! ratings. The tour to recompute is known up front for inserts, but an
//! update or delete must capture it *before* the mutation runs, because a
//! delete leaves nothing to read afterwards:
//!
//! ```text
//! create:          insert ─────────────────────────► spawn(recompute(tour))
//! update/delete:   capture_context(id) ─► authorize ─► mutate ─► recompute(captured tour)
//! ```
//!
//! Recomputation failures are logged and counted but never fail the
//! mutation that triggered them; the tour keeps stale ratings until the
//! next successful trigger.

use crate::environment::Clock;
use crate::error::{Error, Result};
use crate::policy::{authorize_review_mutation, require_role, REVIEWERS};
use crate::ratings::calculate_average_ratings;
use crate::review::{NewReview, Review, ReviewFilter, ReviewPatch};
use crate::store::{ReviewStore, TourStore};
use crate::types::{Actor, ReviewId, TourId};
use std::future::Future;
use tokio::task::JoinHandle;

/// Metric counting recomputation attempts, labelled by `outcome`.
pub const RECOMPUTATIONS_METRIC: &str = "natours_rating_recomputations_total";

/// Handle on a recomputation scheduled in the background after a review
/// was created.
///
/// Dropping it (or calling [`Recomputation::detach`]) lets the task run
/// unobserved; [`Recomputation::wait`] blocks until it has finished.
#[derive(Debug)]
pub struct Recomputation {
    tour: TourId,
    handle: JoinHandle<()>,
}

impl Recomputation {
    /// Tour being recomputed.
    #[must_use]
    pub const fn tour(&self) -> TourId {
        self.tour
    }

    /// Wait for the background recomputation to finish.
    pub async fn wait(self) {
        if let Err(error) = self.handle.await {
            tracing::warn!(tour_id = %self.tour, error = %error, "Rating recomputation task aborted");
        }
    }

    /// Let the recomputation finish on its own.
    pub fn detach(self) {
        drop(self.handle);
    }
}

/// Review use cases, wired to both stores so ratings stay consistent.
#[derive(Clone, Debug)]
pub struct ReviewService<R, T, C> {
    reviews: R,
    tours: T,
    clock: C,
}

impl<R, T, C> ReviewService<R, T, C>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock,
{
    /// Create a service over the given stores.
    #[must_use]
    pub const fn new(reviews: R, tours: T, clock: C) -> Self {
        Self {
            reviews,
            tours,
            clock,
        }
    }

    /// Post a review on `tour_id` as `actor`.
    ///
    /// The review is committed before this returns; the tour's ratings are
    /// recomputed on a background task whose handle is returned alongside.
    ///
    /// # Errors
    ///
    /// - [`Error::Forbidden`] if the actor may not write reviews
    /// - [`Error::Validation`] for an empty body
    /// - [`Error::NotFound`] if the tour does not exist
    /// - [`Error::DuplicateReview`] if the actor already reviewed the tour
    /// - [`Error::StoreUnavailable`] if the insert fails
    pub async fn create(
        &self,
        actor: &Actor,
        tour_id: TourId,
        input: NewReview,
    ) -> Result<(Review, Recomputation)> {
        require_role(actor, REVIEWERS)?;
        input.validate()?;

        if self.tours.find_by_id(tour_id).await?.is_none() {
            return Err(Error::not_found("Tour", tour_id));
        }

        let review = Review::new(tour_id, actor.user_id, input, self.clock.now());
        let created = self.reviews.create(&review).await?;

        tracing::info!(
            review_id = %created.id,
            tour_id = %created.tour,
            user_id = %created.user,
            rating = %created.rating,
            "Review created"
        );

        let recomputation = self.schedule_recompute(created.tour);
        Ok((created, recomputation))
    }

    /// Edit a review's body or rating, then recompute its tour's ratings.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the review does not exist
    /// - [`Error::Forbidden`] if the actor is neither author nor admin
    /// - [`Error::Validation`] for a blank body
    /// - [`Error::StoreUnavailable`] if the lookup or the update fails
    pub async fn update(&self, actor: &Actor, id: ReviewId, patch: ReviewPatch) -> Result<Review> {
        patch.validate()?;

        let updated = self
            .mutate_and_recompute(actor, id, || self.reviews.update(id, &patch))
            .await?;

        tracing::info!(review_id = %id, tour_id = %updated.tour, "Review updated");
        Ok(updated)
    }

    /// Remove a review, then recompute its tour's ratings.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the review does not exist
    /// - [`Error::Forbidden`] if the actor is neither author nor admin
    /// - [`Error::StoreUnavailable`] if the lookup or the delete fails
    pub async fn delete(&self, actor: &Actor, id: ReviewId) -> Result<()> {
        self.mutate_and_recompute(actor, id, move || async move {
            Ok::<_, Error>(self.reviews.delete(id).await?.then_some(()))
        })
        .await?;

        tracing::info!(review_id = %id, "Review deleted");
        Ok(())
    }

    /// Fetch one review.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or [`Error::StoreUnavailable`].
    pub async fn get(&self, id: ReviewId) -> Result<Review> {
        self.reviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Review", id))
    }

    /// List reviews, newest first.
    ///
    /// # Errors
    ///
    /// [`Error::StoreUnavailable`].
    pub async fn list(&self, filter: ReviewFilter) -> Result<Vec<Review>> {
        self.reviews.list(filter).await
    }

    /// Read the review as it is before a mutation, so the affected tour is
    /// still known once the mutation has run.
    ///
    /// # Errors
    ///
    /// [`Error::StoreUnavailable`]. A missing review is `Ok(None)`.
    pub async fn capture_context(&self, id: ReviewId) -> Result<Option<Review>> {
        self.reviews.find_by_id(id).await
    }

    /// Recompute a tour's ratings now, logging instead of returning any
    /// failure.
    pub async fn recompute(&self, tour: TourId) {
        recompute_and_log(&self.reviews, &self.tours, tour).await;
    }

    fn schedule_recompute(&self, tour: TourId) -> Recomputation {
        let reviews = self.reviews.clone();
        let tours = self.tours.clone();
        let handle = tokio::spawn(async move {
            recompute_and_log(&reviews, &tours, tour).await;
        });
        Recomputation { tour, handle }
    }

    /// Capture, authorize, mutate, recompute.
    ///
    /// A review missing at capture time is `NotFound` before any write.
    /// `mutation` resolves to `None` when the review vanished after capture;
    /// the captured tour is still recomputed.
    async fn mutate_and_recompute<F, Fut, O>(
        &self,
        actor: &Actor,
        id: ReviewId,
        mutation: F,
    ) -> Result<O>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<O>>>,
    {
        let Some(captured) = self.capture_context(id).await? else {
            tracing::debug!(review_id = %id, "No review captured, skipping mutation");
            return Err(Error::not_found("Review", id));
        };
        authorize_review_mutation(actor, &captured)?;

        let outcome = mutation().await?;
        self.recompute(captured.tour).await;

        outcome.ok_or_else(|| Error::not_found("Review", id))
    }
}

async fn recompute_and_log<R, T>(reviews: &R, tours: &T, tour: TourId)
where
    R: ReviewStore,
    T: TourStore,
{
    match calculate_average_ratings(reviews, tours, tour).await {
        Ok(_) => {
            metrics::counter!(RECOMPUTATIONS_METRIC, "outcome" => "ok").increment(1);
        },
        Err(error) => {
            metrics::counter!(RECOMPUTATIONS_METRIC, "outcome" => "failed").increment(1);
            tracing::warn!(
                tour_id = %tour,
                error = %error,
                "Rating recomputation failed; tour ratings stay stale until the next review change"
            );
        },
    }
}
