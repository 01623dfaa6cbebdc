//! # Natours Testing
//!
//! Testing utilities for the Natours workspace.
//!
//! This crate provides:
//! - In-memory [`ReviewStore`](natours_core::ReviewStore) and
//!   [`TourStore`](natours_core::TourStore) implementations with an outage
//!   switch
//! - A fixed clock for deterministic timestamps
//! - Fixtures for tours, reviews and actors
//! - [`ConsistencyHarness`], a fluent API over the review and tour services
//!
//! ## Example
//!
//! ```ignore
//! use natours_testing::{fixtures::customer, ConsistencyHarness};
//!
//! #[tokio::test]
//! async fn test_first_review_sets_ratings() {
//!     let harness = ConsistencyHarness::new();
//!     let tour = harness.given_tour("The Forest Hiker").await;
//!
//!     harness.post_review(tour, &customer(), 4).await.unwrap();
//!
//!     harness.then_ratings(tour, 1, 4.0);
//! }
//! ```

use chrono::{DateTime, Utc};
use natours_core::environment::Clock;

pub mod fixtures;
pub mod harness;
pub mod stores;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use natours_testing::mocks::FixedClock;
    /// use natours_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Route `tracing` output through the test harness' captured stdout.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "natours=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use harness::ConsistencyHarness;
pub use mocks::{test_clock, FixedClock};
pub use stores::{InMemoryReviewStore, InMemoryTourStore, Outage};
