//! Rating aggregation.
//!
//! A tour's `ratings_average` and `ratings_quantity` are derived from the
//! live set of its reviews. They are always recomputed from scratch, never
//! adjusted incrementally, so concurrent recomputations for the same tour
//! converge on the same value whichever commits last.
//!
//! ```text
//! ReviewStore::ratings_summary(tour) ──► RatingsSummary { count, average }
//!                                              │
//!                               TourRatings::from_summary
//!                                              │
//!                                              ▼
//!                             TourStore::set_ratings(tour, ratings)
//! ```

use crate::error::Result;
use crate::store::{ReviewStore, TourStore};
use crate::types::TourId;
use serde::{Deserialize, Serialize};

/// Rating shown for a tour that has no reviews.
///
/// Used both when a tour is created and when its last review is removed.
pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;

/// Raw aggregate over the reviews of one tour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingsSummary {
    /// Number of reviews
    pub count: u32,
    /// Mean rating, `None` when `count == 0`
    pub average: Option<f64>,
}

impl RatingsSummary {
    /// Summarise a set of star ratings.
    ///
    /// Stores that cannot push the aggregation down to the database use
    /// this directly.
    #[must_use]
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let (count, total) = ratings
            .into_iter()
            .fold((0_u32, 0_u64), |(count, total), stars| {
                (count + 1, total + u64::from(stars))
            });

        #[allow(clippy::cast_precision_loss)] // star totals stay far below 2^52
        let average = (count > 0).then(|| total as f64 / f64::from(count));

        Self { count, average }
    }
}

/// The two derived fields written back onto a tour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourRatings {
    /// Mean review rating, or [`DEFAULT_RATINGS_AVERAGE`] without reviews
    pub ratings_average: f64,
    /// Number of reviews
    pub ratings_quantity: u32,
}

impl TourRatings {
    /// Ratings of a tour nobody has reviewed yet.
    pub const DEFAULT: Self = Self {
        ratings_average: DEFAULT_RATINGS_AVERAGE,
        ratings_quantity: 0,
    };

    /// Apply the output policy: an empty review set resets to the default
    /// average instead of zero.
    #[must_use]
    pub fn from_summary(summary: RatingsSummary) -> Self {
        match summary.average {
            Some(average) if summary.count > 0 => Self {
                ratings_average: average,
                ratings_quantity: summary.count,
            },
            _ => Self::DEFAULT,
        }
    }
}

impl Default for TourRatings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Recompute a tour's derived rating fields from its reviews and store them.
///
/// Writing to a tour that no longer exists is a silent no-op.
///
/// # Errors
///
/// Returns the store error if either the aggregation read or the write
/// fails. Callers in the review mutation path log and discard it.
pub async fn calculate_average_ratings<R, T>(
    reviews: &R,
    tours: &T,
    tour_id: TourId,
) -> Result<TourRatings>
where
    R: ReviewStore + ?Sized,
    T: TourStore + ?Sized,
{
    let summary = reviews.ratings_summary(tour_id).await?;
    let ratings = TourRatings::from_summary(summary);

    tours.set_ratings(tour_id, ratings).await?;

    tracing::debug!(
        tour_id = %tour_id,
        ratings_quantity = ratings.ratings_quantity,
        ratings_average = ratings.ratings_average,
        "Recomputed tour ratings"
    );

    Ok(ratings)
}
