//! Router assembly.

use crate::error::AppError;
use crate::handlers::{health, reviews, tours};
use crate::middleware::track_correlation_id;
use crate::state::AppState;
use axum::{http::Uri, routing::get, Router};
use natours_core::environment::Clock;
use natours_core::store::{ReviewStore, TourStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router.
///
/// ```text
/// /health                          liveness
/// /health/ready                    readiness
/// /api/v1/tours                    GET list, POST create
/// /api/v1/tours/top-5-cheap        GET
/// /api/v1/tours/tour-stats         GET
/// /api/v1/tours/monthly-plan/:year GET (staff)
/// /api/v1/tours/slug/:slug         GET
/// /api/v1/tours/:id                GET, PATCH, DELETE
/// /api/v1/tours/:id/reviews        GET list, POST create
/// /api/v1/reviews                  GET list
/// /api/v1/reviews/:id              GET, PATCH, DELETE
/// ```
pub fn router<R, T, C>(state: AppState<R, T, C>) -> Router
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let api = Router::new()
        .route(
            "/tours",
            get(tours::list_tours::<R, T, C>).post(tours::create_tour::<R, T, C>),
        )
        .route("/tours/top-5-cheap", get(tours::top_cheap::<R, T, C>))
        .route("/tours/tour-stats", get(tours::tour_stats::<R, T, C>))
        .route(
            "/tours/monthly-plan/:year",
            get(tours::monthly_plan::<R, T, C>),
        )
        .route("/tours/slug/:slug", get(tours::get_tour_by_slug::<R, T, C>))
        .route(
            "/tours/:id",
            get(tours::get_tour::<R, T, C>)
                .patch(tours::update_tour::<R, T, C>)
                .delete(tours::delete_tour::<R, T, C>),
        )
        .route(
            "/tours/:id/reviews",
            get(reviews::list_tour_reviews::<R, T, C>).post(reviews::create_review::<R, T, C>),
        )
        .route("/reviews", get(reviews::list_reviews::<R, T, C>))
        .route(
            "/reviews/:id",
            get(reviews::get_review::<R, T, C>)
                .patch(reviews::update_review::<R, T, C>)
                .delete(reviews::delete_review::<R, T, C>),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness::<R, T, C>))
        .nest("/api/v1", api)
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(track_correlation_id))
}

#[allow(clippy::unused_async)]
async fn not_found(uri: Uri) -> AppError {
    AppError::no_route(uri.path())
}
