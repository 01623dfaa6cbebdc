//! `/api/v1/reviews` and `/api/v1/tours/:id/reviews` handlers.
//!
//! Creating a review answers as soon as the review is stored; the tour's
//! ratings catch up on a background task. Updates and deletes answer only
//! after the ratings have been rewritten.

use crate::error::AppError;
use crate::extractors::{Authenticated, CorrelationId};
use crate::response::{created, Envelope};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use natours_core::environment::Clock;
use natours_core::review::{NewReview, Review, ReviewFilter, ReviewPatch};
use natours_core::store::{ReviewStore, TourStore};
use natours_core::types::{ReviewId, TourId};

/// `GET /reviews`
///
/// # Errors
///
/// 503 when the store is down.
pub async fn list_reviews<R, T, C>(
    State(state): State<AppState<R, T, C>>,
) -> Result<Envelope<Vec<Review>>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    Ok(Envelope::list(
        state.reviews().list(ReviewFilter::default()).await?,
    ))
}

/// `GET /tours/:id/reviews`
///
/// # Errors
///
/// 400 on a malformed id, 503.
pub async fn list_tour_reviews<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    tour: Result<Path<TourId>, PathRejection>,
) -> Result<Envelope<Vec<Review>>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(tour) = tour?;
    Ok(Envelope::list(
        state.reviews().list(ReviewFilter::for_tour(tour)).await?,
    ))
}

/// `POST /tours/:id/reviews`
///
/// # Errors
///
/// 400, 401, 403 for non-customers, 404 for an unknown tour, 409 for a
/// second review of the same tour, 422, 503.
pub async fn create_review<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Authenticated(actor): Authenticated,
    correlation_id: CorrelationId,
    tour: Result<Path<TourId>, PathRejection>,
    body: Result<Json<NewReview>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(tour) = tour?;
    let Json(input) = body?;

    let (review, recomputation) = state.reviews().create(&actor, tour, input).await?;
    tracing::debug!(
        correlation_id = %correlation_id.0,
        tour_id = %recomputation.tour(),
        "Ratings recomputation scheduled"
    );
    recomputation.detach();

    Ok(created(review))
}

/// `GET /reviews/:id`
///
/// # Errors
///
/// 400, 404, 503.
pub async fn get_review<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    id: Result<Path<ReviewId>, PathRejection>,
) -> Result<Envelope<Review>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(id) = id?;
    Ok(Envelope::item(state.reviews().get(id).await?))
}

/// `PATCH /reviews/:id`
///
/// # Errors
///
/// 400, 401, 403 unless author or admin, 404, 422, 503.
pub async fn update_review<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Authenticated(actor): Authenticated,
    id: Result<Path<ReviewId>, PathRejection>,
    body: Result<Json<ReviewPatch>, JsonRejection>,
) -> Result<Envelope<Review>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(id) = id?;
    let Json(patch) = body?;
    Ok(Envelope::item(state.reviews().update(&actor, id, patch).await?))
}

/// `DELETE /reviews/:id`
///
/// # Errors
///
/// 400, 401, 403 unless author or admin, 404, 503.
pub async fn delete_review<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Authenticated(actor): Authenticated,
    id: Result<Path<ReviewId>, PathRejection>,
) -> Result<StatusCode, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(id) = id?;
    state.reviews().delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
