//! Fluent harness for rating consistency scenarios.
//!
//! Wires a [`ReviewService`] and a [`TourService`] to fresh in-memory
//! stores and a fixed clock, and offers assertion helpers on the derived
//! rating fields.
//!
//! # Example
//!
//! ```ignore
//! let harness = ConsistencyHarness::new();
//! let tour = harness.given_tour("The Forest Hiker").await;
//! let review = harness.post_review(tour, &customer(), 5).await?;
//! harness.then_ratings(tour, 1, 5.0);
//! ```

#![allow(clippy::missing_panics_doc)] // Assertion helpers panic by design

use crate::fixtures::{lead_guide, review_input, tour_input};
use crate::mocks::{test_clock, FixedClock};
use crate::stores::{InMemoryReviewStore, InMemoryTourStore};
use natours_core::error::Result;
use natours_core::ratings::TourRatings;
use natours_core::review::Review;
use natours_core::service::{ReviewService, TourService};
use natours_core::types::{Actor, TourId};

/// Review service over in-memory stores.
pub type InMemoryReviewService = ReviewService<InMemoryReviewStore, InMemoryTourStore, FixedClock>;

/// Tour service over the in-memory tour store.
pub type InMemoryTourService = TourService<InMemoryTourStore, FixedClock>;

/// Everything a consistency test needs.
#[derive(Clone, Debug)]
pub struct ConsistencyHarness {
    /// Review store shared with the services
    pub reviews: InMemoryReviewStore,
    /// Tour store shared with the services
    pub tours: InMemoryTourStore,
    /// Review use cases
    pub review_service: InMemoryReviewService,
    /// Tour use cases
    pub tour_service: InMemoryTourService,
}

impl Default for ConsistencyHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsistencyHarness {
    /// Fresh, empty stores.
    #[must_use]
    pub fn new() -> Self {
        let reviews = InMemoryReviewStore::new();
        let tours = InMemoryTourStore::new();
        Self {
            review_service: ReviewService::new(reviews.clone(), tours.clone(), test_clock()),
            tour_service: TourService::new(tours.clone(), test_clock()),
            reviews,
            tours,
        }
    }

    /// Create a tour named `name` and return its id.
    #[allow(clippy::expect_used)]
    pub async fn given_tour(&self, name: &str) -> TourId {
        self.tour_service
            .create(&lead_guide(), tour_input(name))
            .await
            .expect("fixture tour should be valid")
            .id
    }

    /// Post a review and wait for its background recomputation.
    ///
    /// # Errors
    ///
    /// Propagates the service error, e.g. a duplicate review.
    pub async fn post_review(&self, tour: TourId, author: &Actor, rating: u8) -> Result<Review> {
        let (review, recomputation) = self
            .review_service
            .create(author, tour, review_input(rating))
            .await?;
        recomputation.wait().await;
        Ok(review)
    }

    /// Current derived ratings of `tour`.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn ratings(&self, tour: TourId) -> TourRatings {
        self.tours.ratings_of(tour).expect("tour should exist")
    }

    /// Assert the derived ratings of `tour`.
    #[allow(clippy::panic)]
    pub fn then_ratings(&self, tour: TourId, quantity: u32, average: f64) {
        let ratings = self.ratings(tour);
        assert_eq!(
            ratings.ratings_quantity, quantity,
            "expected {quantity} ratings on tour {tour}, found {}",
            ratings.ratings_quantity
        );
        assert!(
            (ratings.ratings_average - average).abs() < 1e-9,
            "expected average {average} on tour {tour}, found {}",
            ratings.ratings_average
        );
    }

    /// Assert that the derived ratings match the live review set exactly.
    pub fn then_consistent(&self, tour: TourId) {
        let live = self.reviews.ratings_of(tour);
        let expected = TourRatings::from_summary(natours_core::RatingsSummary::from_ratings(live));
        self.then_ratings(tour, expected.ratings_quantity, expected.ratings_average);
    }
}
