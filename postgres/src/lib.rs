//! `PostgreSQL` stores for Natours.
//!
//! Implements [`ReviewStore`](natours_core::ReviewStore) and
//! [`TourStore`](natours_core::TourStore) on top of a shared sqlx pool:
//!
//! - `UNIQUE (tour_id, user_id)` on `reviews` backs the one-review-per-user
//!   rule and surfaces as [`Error::DuplicateReview`]
//! - the ratings summary is a single `COUNT`/`AVG` query, so the aggregation
//!   never loads review rows into memory
//! - every driver failure becomes [`Error::StoreUnavailable`]
//!
//! # Example
//!
//! ```no_run
//! use natours_postgres::{connect, PoolConfig, PostgresReviewStore, PostgresTourStore};
//!
//! # async fn example() -> natours_core::Result<()> {
//! let pool = connect(&PoolConfig::new("postgres://localhost/natours")).await?;
//! natours_postgres::migrate(&pool).await?;
//!
//! let reviews = PostgresReviewStore::new(pool.clone());
//! let tours = PostgresTourStore::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod reviews;
mod tours;

use natours_core::Error;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub use reviews::PostgresReviewStore;
pub use tours::PostgresTourStore;

/// Connection pool settings.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Connection string
    pub url: String,
    /// Upper bound on open connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    /// Default pool settings for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`Error::StoreUnavailable`] if the database cannot be reached.
pub async fn connect(config: &PoolConfig) -> Result<PgPool, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| Error::StoreUnavailable(format!("Failed to connect: {e}")))?;

    tracing::info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );
    Ok(pool)
}

/// Create or upgrade the `tours` and `reviews` tables.
///
/// # Errors
///
/// Returns [`Error::StoreUnavailable`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| Error::StoreUnavailable(format!("Migration failed: {e}")))
}

/// Check that the database answers.
///
/// # Errors
///
/// Returns [`Error::StoreUnavailable`] if it does not.
pub async fn ping(pool: &PgPool) -> Result<(), Error> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| unavailable("ping", &e))
}

fn unavailable(operation: &str, error: &sqlx::Error) -> Error {
    tracing::error!(operation, error = %error, "Database operation failed");
    Error::StoreUnavailable(format!("Failed to {operation}: {error}"))
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn corrupt(column: &str, detail: impl std::fmt::Display) -> Error {
    Error::StoreUnavailable(format!("Invalid {column} in database row: {detail}"))
}

fn to_db_int(value: u32, field: &str) -> Result<i32, Error> {
    i32::try_from(value).map_err(|_| Error::validation(format!("{field} is too large")))
}

fn from_db_int(value: i32, column: &str) -> Result<u32, Error> {
    u32::try_from(value).map_err(|e| corrupt(column, e))
}
