//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use natours_core::environment::Clock;
use natours_core::query::TourQuery;
use natours_core::store::{ReviewStore, TourStore};
use serde_json::{json, Value};

/// Liveness: the process is up. Does not touch the stores.
///
/// ```text
/// GET /health  ->  200 "ok"
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness: the tour store answers a one-row listing.
///
/// ```text
/// GET /health/ready  ->  200 {"status":"ready"} | 503
/// ```
///
/// # Errors
///
/// 503 when the store is down.
pub async fn readiness<R, T, C>(
    State(state): State<AppState<R, T, C>>,
) -> Result<Json<Value>, AppError>
where
    R: ReviewStore + Clone + 'static,
    T: TourStore + Clone + 'static,
    C: Clock + Clone + 'static,
{
    let one_row = TourQuery {
        limit: 1,
        ..TourQuery::default()
    };
    state.tours().list(&one_row).await?;
    Ok(Json(json!({ "status": "ready" })))
}
