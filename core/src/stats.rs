//! Reporting aggregates over the tour catalogue.

use crate::tour::{Difficulty, Tour};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-difficulty statistics over well-rated tours.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyStats {
    /// Group key
    pub difficulty: Difficulty,
    /// Tours in the group
    pub num_tours: u32,
    /// Sum of their review counts
    pub num_ratings: u64,
    /// Mean of their average ratings
    pub avg_rating: f64,
    /// Mean price
    pub avg_price: f64,
    /// Cheapest price
    pub min_price: f64,
    /// Dearest price
    pub max_price: f64,
}

/// Tours starting in one month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPlan {
    /// Month number, 1 to 12
    pub month: u32,
    /// Start dates falling in this month
    pub num_tour_starts: u32,
    /// Names of the tours starting
    pub tours: Vec<String>,
}

/// Lowest `ratings_average` a tour needs to count towards [`tour_stats`].
pub const STATS_MIN_RATING: f64 = 4.5;

/// Statistics grouped by difficulty over non-secret tours rated at least
/// [`STATS_MIN_RATING`], cheapest group first.
#[must_use]
pub fn tour_stats<'a, I>(tours: I) -> Vec<DifficultyStats>
where
    I: IntoIterator<Item = &'a Tour>,
{
    let mut groups: BTreeMap<Difficulty, Vec<&Tour>> = BTreeMap::new();
    for tour in tours {
        if !tour.secret_tour && tour.ratings_average >= STATS_MIN_RATING {
            groups.entry(tour.difficulty).or_default().push(tour);
        }
    }

    let mut stats: Vec<DifficultyStats> = groups
        .into_iter()
        .map(|(difficulty, members)| {
            #[allow(clippy::cast_precision_loss)] // group sizes are tiny
            let n = members.len() as f64;
            DifficultyStats {
                difficulty,
                num_tours: u32::try_from(members.len()).unwrap_or(u32::MAX),
                num_ratings: members.iter().map(|t| u64::from(t.ratings_quantity)).sum(),
                avg_rating: members.iter().map(|t| t.ratings_average).sum::<f64>() / n,
                avg_price: members.iter().map(|t| t.price).sum::<f64>() / n,
                min_price: members.iter().map(|t| t.price).fold(f64::INFINITY, f64::min),
                max_price: members
                    .iter()
                    .map(|t| t.price)
                    .fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect();

    stats.sort_by(|a, b| a.avg_price.total_cmp(&b.avg_price));
    stats
}

/// Busiest months of `year`, by number of tour start dates.
#[must_use]
pub fn monthly_plan<'a, I>(tours: I, year: i32) -> Vec<MonthlyPlan>
where
    I: IntoIterator<Item = &'a Tour>,
{
    let mut months: BTreeMap<u32, MonthlyPlan> = BTreeMap::new();
    for tour in tours {
        if tour.secret_tour {
            continue;
        }
        for start in tour.start_dates.iter().filter(|d| d.year() == year) {
            let plan = months.entry(start.month()).or_insert_with(|| MonthlyPlan {
                month: start.month(),
                num_tour_starts: 0,
                tours: Vec::new(),
            });
            plan.num_tour_starts += 1;
            plan.tours.push(tour.name.clone());
        }
    }

    let mut plan: Vec<MonthlyPlan> = months.into_values().collect();
    plan.sort_by(|a, b| {
        b.num_tour_starts
            .cmp(&a.num_tour_starts)
            .then(a.month.cmp(&b.month))
    });
    plan.truncate(12);
    plan
}
