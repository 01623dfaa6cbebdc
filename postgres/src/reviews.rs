//! `reviews` table.

use crate::{corrupt, is_unique_violation, unavailable};
use chrono::{DateTime, Utc};
use natours_core::error::{Error, Result};
use natours_core::ratings::RatingsSummary;
use natours_core::review::{Review, ReviewFilter, ReviewPatch};
use natours_core::store::ReviewStore;
use natours_core::types::{Rating, ReviewId, TourId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, review, rating, tour_id, user_id, created_at";

/// `PostgreSQL` review store.
#[derive(Clone, Debug)]
pub struct PostgresReviewStore {
    pool: PgPool,
}

impl PostgresReviewStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    review: String,
    rating: i16,
    tour_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = Error;

    fn try_from(row: ReviewRow) -> Result<Self> {
        let stars = u8::try_from(row.rating).map_err(|e| corrupt("rating", e))?;
        Ok(Self {
            id: ReviewId::from_uuid(row.id),
            body: row.review,
            rating: Rating::new(stars).map_err(|e| corrupt("rating", e))?,
            tour: TourId::from_uuid(row.tour_id),
            user: UserId::from_uuid(row.user_id),
            created_at: row.created_at,
        })
    }
}

impl ReviewStore for PostgresReviewStore {
    async fn create(&self, review: &Review) -> Result<Review> {
        let row: ReviewRow = sqlx::query_as(&format!(
            "INSERT INTO reviews ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        ))
        .bind(review.id.as_uuid())
        .bind(&review.body)
        .bind(i16::from(review.rating.value()))
        .bind(review.tour.as_uuid())
        .bind(review.user.as_uuid())
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateReview {
                    tour: review.tour.to_string(),
                    user: review.user.to_string(),
                }
            } else {
                unavailable("insert review", &e)
            }
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>> {
        let row: Option<ReviewRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM reviews WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| unavailable("get review", &e))?;

        row.map(Review::try_from).transpose()
    }

    async fn update(&self, id: ReviewId, patch: &ReviewPatch) -> Result<Option<Review>> {
        let row: Option<ReviewRow> = sqlx::query_as(&format!(
            r"
            UPDATE reviews
            SET review = COALESCE($2, review),
                rating = COALESCE($3, rating)
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(patch.body.as_deref().map(str::trim))
        .bind(patch.rating.map(|r| i16::from(r.value())))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable("update review", &e))?;

        row.map(Review::try_from).transpose()
    }

    async fn delete(&self, id: ReviewId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("delete review", &e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, filter: ReviewFilter) -> Result<Vec<Review>> {
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            r"
            SELECT {COLUMNS} FROM reviews
            WHERE $1::uuid IS NULL OR tour_id = $1
            ORDER BY created_at DESC, id ASC
            "
        ))
        .bind(filter.tour.map(|tour| *tour.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| unavailable("list reviews", &e))?;

        rows.into_iter().map(Review::try_from).collect()
    }

    async fn ratings_summary(&self, tour: TourId) -> Result<RatingsSummary> {
        let (count, average): (i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(rating)::float8 FROM reviews WHERE tour_id = $1",
        )
        .bind(tour.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unavailable("summarise ratings", &e))?;

        Ok(RatingsSummary {
            count: u32::try_from(count).map_err(|e| corrupt("review count", e))?,
            average,
        })
    }
}
