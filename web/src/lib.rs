//! HTTP API for the Natours tour catalogue and its reviews.
//!
//! A thin `axum` shell over `natours-core`: handlers parse the request,
//! call a service and map the outcome to JSON. No business rule lives
//! here, including the rating recomputation that follows every review
//! change.
//!
//! # Request Flow
//!
//! 1. [`middleware`] assigns a correlation id and opens a request span
//! 2. [`extractors::Authenticated`] verifies the bearer token, if the route
//!    needs one
//! 3. The handler calls [`natours_core::ReviewService`] or
//!    [`natours_core::TourService`]
//! 4. Success is wrapped in [`response::Envelope`]; failure becomes an
//!    [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use natours_web::{router, AppState, JwtVerifier};
//!
//! let state = AppState::new(reviews, tours, SystemClock, JwtVerifier::new(secret));
//! axum::serve(listener, router(state)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use auth::{Claims, JwtVerifier};
pub use error::AppError;
pub use extractors::{Authenticated, CorrelationId};
pub use middleware::{track_correlation_id, CORRELATION_ID_HEADER};
pub use routes::router;
pub use state::AppState;
