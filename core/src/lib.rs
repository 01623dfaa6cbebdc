//! # Natours Core
//!
//! Domain model and use cases for the Natours tour-booking backend.
//!
//! The interesting part of this crate is the rating consistency engine: a
//! tour's `ratings_average` and `ratings_quantity` are derived from its
//! reviews and are rewritten after every review insert, update and delete.
//!
//! ## Layers
//!
//! - **Model**: [`Tour`], [`Review`], identifiers and value objects
//! - **Stores**: [`ReviewStore`] and [`TourStore`] traits, implemented by
//!   `natours-testing` (in memory) and `natours-postgres`
//! - **Aggregator**: [`ratings::calculate_average_ratings`], a free function
//!   over explicit store handles
//! - **Trigger**: [`ReviewService`], which captures the affected tour before
//!   a mutation and recomputes it afterwards
//!
//! ## Example
//!
//! ```ignore
//! use natours_core::{ReviewService, environment::SystemClock};
//!
//! let service = ReviewService::new(review_store, tour_store, SystemClock);
//!
//! // Insert commits now; the recomputation runs in the background.
//! let (review, recomputation) = service.create(&actor, tour_id, input).await?;
//! recomputation.detach();
//!
//! // Update and delete recompute inline before returning.
//! service.delete(&actor, review.id).await?;
//! ```

pub mod environment;
pub mod error;
pub mod policy;
pub mod query;
pub mod ratings;
pub mod review;
pub mod service;
pub mod stats;
pub mod store;
pub mod tour;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use error::{Error, Result};
pub use query::{TourQuery, TourQueryParams};
pub use ratings::{DEFAULT_RATINGS_AVERAGE, RatingsSummary, TourRatings};
pub use review::{NewReview, Review, ReviewFilter, ReviewPatch};
pub use service::{Recomputation, ReviewService, TourService};
pub use store::{ReviewStore, TourStore};
pub use tour::{Difficulty, NewTour, Tour, TourPatch};
pub use types::{Actor, Rating, ReviewId, Role, TourId, UserId};
