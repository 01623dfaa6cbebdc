//! `tours` table.

use crate::{corrupt, from_db_int, is_unique_violation, to_db_int, unavailable};
use chrono::{DateTime, Utc};
use natours_core::error::{Error, Result};
use natours_core::query::TourQuery;
use natours_core::ratings::TourRatings;
use natours_core::store::TourStore;
use natours_core::tour::{Tour, TourPatch};
use natours_core::types::TourId;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, name, slug, duration, max_group_size, difficulty, \
    ratings_average, ratings_quantity, price, price_discount, summary, description, \
    start_dates, secret_tour, created_at";

/// `PostgreSQL` tour store.
#[derive(Clone, Debug)]
pub struct PostgresTourStore {
    pool: PgPool,
}

impl PostgresTourStore {
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
struct TourRow {
    id: Uuid,
    name: String,
    slug: String,
    duration: i32,
    max_group_size: i32,
    difficulty: String,
    ratings_average: f64,
    ratings_quantity: i32,
    price: f64,
    price_discount: Option<f64>,
    summary: String,
    description: Option<String>,
    start_dates: Vec<DateTime<Utc>>,
    secret_tour: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TourRow> for Tour {
    type Error = Error;

    fn try_from(row: TourRow) -> Result<Self> {
        Ok(Self {
            id: TourId::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            duration: from_db_int(row.duration, "duration")?,
            max_group_size: from_db_int(row.max_group_size, "max_group_size")?,
            difficulty: row
                .difficulty
                .parse()
                .map_err(|e| corrupt("difficulty", e))?,
            ratings_average: row.ratings_average,
            ratings_quantity: from_db_int(row.ratings_quantity, "ratings_quantity")?,
            price: row.price,
            price_discount: row.price_discount,
            summary: row.summary,
            description: row.description,
            start_dates: row.start_dates,
            secret_tour: row.secret_tour,
            created_at: row.created_at,
        })
    }
}

fn tour_conflict(error: &sqlx::Error, tour: &Tour) -> Error {
    let on_slug = matches!(
        error,
        sqlx::Error::Database(db_err) if db_err.constraint() == Some("tours_slug_key")
    );
    if on_slug {
        Error::Conflict(format!("a tour with slug {} already exists", tour.slug))
    } else {
        Error::Conflict(format!("a tour named {} already exists", tour.name))
    }
}

/// Append `WHERE`, `ORDER BY` and `LIMIT`/`OFFSET` clauses for `query`.
///
/// Sort columns come from a closed enum, never from user text.
fn push_listing(sql: &mut QueryBuilder<'_, Postgres>, query: &TourQuery) -> Result<()> {
    sql.push(" WHERE NOT secret_tour");
    if let Some(difficulty) = query.difficulty {
        sql.push(" AND difficulty = ").push_bind(difficulty.as_str());
    }
    if let Some(price) = query.price_gte {
        sql.push(" AND price >= ").push_bind(price);
    }
    if let Some(price) = query.price_lte {
        sql.push(" AND price <= ").push_bind(price);
    }
    if let Some(rating) = query.ratings_average_gte {
        sql.push(" AND ratings_average >= ").push_bind(rating);
    }
    if let Some(duration) = query.duration_lte {
        sql.push(" AND duration <= ")
            .push_bind(to_db_int(duration, "duration")?);
    }

    sql.push(" ORDER BY ");
    for key in &query.sort {
        sql.push(key.field.column())
            .push(if key.descending { " DESC, " } else { " ASC, " });
    }
    sql.push("id ASC");

    sql.push(" LIMIT ")
        .push_bind(i64::from(query.limit))
        .push(" OFFSET ")
        .push_bind(i64::from(query.offset()));
    Ok(())
}

impl TourStore for PostgresTourStore {
    async fn create(&self, tour: &Tour) -> Result<Tour> {
        let row: TourRow = sqlx::query_as(&format!(
            r"
            INSERT INTO tours ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {COLUMNS}
            "
        ))
        .bind(tour.id.as_uuid())
        .bind(&tour.name)
        .bind(&tour.slug)
        .bind(to_db_int(tour.duration, "duration")?)
        .bind(to_db_int(tour.max_group_size, "maxGroupSize")?)
        .bind(tour.difficulty.as_str())
        .bind(tour.ratings_average)
        .bind(to_db_int(tour.ratings_quantity, "ratingsQuantity")?)
        .bind(tour.price)
        .bind(tour.price_discount)
        .bind(&tour.summary)
        .bind(tour.description.as_deref())
        .bind(&tour.start_dates)
        .bind(tour.secret_tour)
        .bind(tour.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tour_conflict(&e, tour)
            } else {
                unavailable("insert tour", &e)
            }
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: TourId) -> Result<Option<Tour>> {
        let row: Option<TourRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM tours WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| unavailable("get tour", &e))?;

        row.map(Tour::try_from).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tour>> {
        let row: Option<TourRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM tours WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable("get tour by slug", &e))?;

        row.map(Tour::try_from).transpose()
    }

    async fn list(&self, query: &TourQuery) -> Result<Vec<Tour>> {
        let mut sql = QueryBuilder::new(format!("SELECT {COLUMNS} FROM tours"));
        push_listing(&mut sql, query)?;

        let rows: Vec<TourRow> = sql
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| unavailable("list tours", &e))?;

        rows.into_iter().map(Tour::try_from).collect()
    }

    async fn list_all(&self) -> Result<Vec<Tour>> {
        let rows: Vec<TourRow> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM tours"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| unavailable("list tours", &e))?;

        rows.into_iter().map(Tour::try_from).collect()
    }

    async fn update(&self, id: TourId, patch: &TourPatch) -> Result<Option<Tour>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| unavailable("begin transaction", &e))?;

        let row: Option<TourRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM tours WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| unavailable("lock tour", &e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut tour = Tour::try_from(row)?;
        tour.apply(patch.clone())?;

        // Ratings columns are left alone: they belong to the aggregator.
        sqlx::query(
            r"
            UPDATE tours
            SET name = $2, slug = $3, duration = $4, max_group_size = $5,
                difficulty = $6, price = $7, price_discount = $8, summary = $9,
                description = $10, start_dates = $11, secret_tour = $12
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .bind(&tour.name)
        .bind(&tour.slug)
        .bind(to_db_int(tour.duration, "duration")?)
        .bind(to_db_int(tour.max_group_size, "maxGroupSize")?)
        .bind(tour.difficulty.as_str())
        .bind(tour.price)
        .bind(tour.price_discount)
        .bind(&tour.summary)
        .bind(tour.description.as_deref())
        .bind(&tour.start_dates)
        .bind(tour.secret_tour)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tour_conflict(&e, &tour)
            } else {
                unavailable("update tour", &e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| unavailable("commit tour update", &e))?;

        Ok(Some(tour))
    }

    async fn delete(&self, id: TourId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("delete tour", &e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_ratings(&self, id: TourId, ratings: TourRatings) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tours SET ratings_average = $2, ratings_quantity = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(ratings.ratings_average)
        .bind(to_db_int(ratings.ratings_quantity, "ratingsQuantity")?)
        .execute(&self.pool)
        .await
        .map_err(|e| unavailable("write tour ratings", &e))?;

        if result.rows_affected() == 0 {
            tracing::debug!(tour_id = %id, "Tour vanished before its ratings were written");
        }
        Ok(())
    }
}
