//! Application state shared across all HTTP handlers.

use crate::auth::JwtVerifier;
use axum::extract::FromRef;
use natours_core::environment::Clock;
use natours_core::service::{ReviewService, TourService};
use natours_core::store::{ReviewStore, TourStore};
use std::sync::Arc;

/// Services and the token verifier, generic over the store backends so the
/// same router runs on `PostgreSQL` in production and in memory in tests.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::new(
///     PostgresReviewStore::new(pool.clone()),
///     PostgresTourStore::new(pool),
///     SystemClock,
///     JwtVerifier::new(secret.as_bytes()),
/// );
/// let app = natours_web::router(state);
/// ```
#[derive(Clone, Debug)]
pub struct AppState<R, T, C> {
    reviews: ReviewService<R, T, C>,
    tours: TourService<T, C>,
    verifier: Arc<JwtVerifier>,
}

impl<R, T, C> AppState<R, T, C>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone,
{
    /// Wire both services to the given stores.
    #[must_use]
    pub fn new(reviews: R, tours: T, clock: C, verifier: JwtVerifier) -> Self {
        Self {
            reviews: ReviewService::new(reviews, tours.clone(), clock.clone()),
            tours: TourService::new(tours, clock),
            verifier: Arc::new(verifier),
        }
    }
}

impl<R, T, C> AppState<R, T, C> {
    /// Review use cases.
    #[must_use]
    pub const fn reviews(&self) -> &ReviewService<R, T, C> {
        &self.reviews
    }

    /// Tour use cases.
    #[must_use]
    pub const fn tours(&self) -> &TourService<T, C> {
        &self.tours
    }
}

impl<R, T, C> FromRef<AppState<R, T, C>> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState<R, T, C>) -> Self {
        Arc::clone(&state.verifier)
    }
}
