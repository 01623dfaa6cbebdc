//! `/api/v1/tours` handlers.

use crate::error::AppError;
use crate::extractors::Authenticated;
use crate::response::{created, Envelope};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use natours_core::environment::Clock;
use natours_core::query::{TourQuery, TourQueryParams};
use natours_core::stats::{DifficultyStats, MonthlyPlan};
use natours_core::store::{ReviewStore, TourStore};
use natours_core::tour::{NewTour, Tour, TourPatch};
use natours_core::types::TourId;
use serde::Serialize;

/// A tour as returned by the API, with its virtual fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourView {
    #[serde(flatten)]
    tour: Tour,
    duration_weeks: f64,
}

impl From<Tour> for TourView {
    fn from(tour: Tour) -> Self {
        Self {
            duration_weeks: tour.duration_weeks(),
            tour,
        }
    }
}

fn views(tours: Vec<Tour>) -> Envelope<Vec<TourView>> {
    Envelope::list(tours.into_iter().map(TourView::from).collect())
}

/// `GET /tours`
///
/// # Errors
///
/// 400 on malformed parameters, 422 on invalid filters, 503 when the store
/// is down.
pub async fn list_tours<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    params: Result<Query<TourQueryParams>, QueryRejection>,
) -> Result<Envelope<Vec<TourView>>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Query(params) = params?;
    let query = TourQuery::try_from(params)?;
    Ok(views(state.tours().list(&query).await?))
}

/// `GET /tours/top-5-cheap`
///
/// # Errors
///
/// 503 when the store is down.
pub async fn top_cheap<R, T, C>(
    State(state): State<AppState<R, T, C>>,
) -> Result<Envelope<Vec<TourView>>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    Ok(views(state.tours().list(&TourQuery::top_cheap()).await?))
}

/// `GET /tours/tour-stats`
///
/// # Errors
///
/// 503 when the store is down.
pub async fn tour_stats<R, T, C>(
    State(state): State<AppState<R, T, C>>,
) -> Result<Envelope<Vec<DifficultyStats>>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    Ok(Envelope::list(state.tours().stats().await?))
}

/// `GET /tours/monthly-plan/:year`
///
/// # Errors
///
/// 401 without a token, 403 for customers, 503 when the store is down.
pub async fn monthly_plan<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Authenticated(actor): Authenticated,
    year: Result<Path<i32>, PathRejection>,
) -> Result<Envelope<Vec<MonthlyPlan>>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(year) = year?;
    Ok(Envelope::list(state.tours().monthly_plan(&actor, year).await?))
}

/// `POST /tours`
///
/// # Errors
///
/// 401, 403, 409 on a taken name, 422 on invalid fields.
pub async fn create_tour<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Authenticated(actor): Authenticated,
    body: Result<Json<NewTour>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Json(input) = body?;
    let tour = state.tours().create(&actor, input).await?;
    Ok(created(TourView::from(tour)))
}

/// `GET /tours/:id`
///
/// # Errors
///
/// 400 on a malformed id, 404, 503.
pub async fn get_tour<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    id: Result<Path<TourId>, PathRejection>,
) -> Result<Envelope<TourView>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(id) = id?;
    Ok(Envelope::item(state.tours().get(id).await?.into()))
}

/// `GET /tours/slug/:slug`
///
/// # Errors
///
/// 404 for an unknown slug, 503 when the store is down.
pub async fn get_tour_by_slug<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Path(slug): Path<String>,
) -> Result<Envelope<TourView>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    Ok(Envelope::item(state.tours().get_by_slug(&slug).await?.into()))
}

/// `PATCH /tours/:id`
///
/// Rating fields in the body are ignored.
///
/// # Errors
///
/// 400, 401, 403, 404, 409, 422, 503.
pub async fn update_tour<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Authenticated(actor): Authenticated,
    id: Result<Path<TourId>, PathRejection>,
    body: Result<Json<TourPatch>, JsonRejection>,
) -> Result<Envelope<TourView>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(id) = id?;
    let Json(patch) = body?;
    let tour = state.tours().update(&actor, id, patch).await?;
    Ok(Envelope::item(tour.into()))
}

/// `DELETE /tours/:id`
///
/// # Errors
///
/// 400, 401, 403, 404, 503.
pub async fn delete_tour<R, T, C>(
    State(state): State<AppState<R, T, C>>,
    Authenticated(actor): Authenticated,
    id: Result<Path<TourId>, PathRejection>,
) -> Result<StatusCode, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let Path(id) = id?;
    state.tours().delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
