//! Filtering, sorting and pagination of tour listings.
//!
//! URL parameters follow the bracket convention of the public API:
//!
//! ```text
//! GET /api/v1/tours?difficulty=easy&price[lte]=1000&sort=-ratingsAverage,price&page=2&limit=10
//! ```

use crate::error::{Error, Result};
use crate::tour::{Difficulty, Tour};
use serde::Deserialize;
use std::cmp::Ordering;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 100;
/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// Tour field a listing can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    /// `price`
    Price,
    /// `ratingsAverage`
    RatingsAverage,
    /// `ratingsQuantity`
    RatingsQuantity,
    /// `duration`
    Duration,
    /// `name`
    Name,
    /// `createdAt`
    CreatedAt,
}

impl SortField {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "price" => Ok(Self::Price),
            "ratingsAverage" => Ok(Self::RatingsAverage),
            "ratingsQuantity" => Ok(Self::RatingsQuantity),
            "duration" => Ok(Self::Duration),
            "name" => Ok(Self::Name),
            "createdAt" => Ok(Self::CreatedAt),
            other => Err(Error::validation(format!("cannot sort tours by {other}"))),
        }
    }

    /// Snake-case column name used by SQL backends.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::RatingsAverage => "ratings_average",
            Self::RatingsQuantity => "ratings_quantity",
            Self::Duration => "duration",
            Self::Name => "name",
            Self::CreatedAt => "created_at",
        }
    }

    fn compare(self, a: &Tour, b: &Tour) -> Ordering {
        match self {
            Self::Price => a.price.total_cmp(&b.price),
            Self::RatingsAverage => a.ratings_average.total_cmp(&b.ratings_average),
            Self::RatingsQuantity => a.ratings_quantity.cmp(&b.ratings_quantity),
            Self::Duration => a.duration.cmp(&b.duration),
            Self::Name => a.name.cmp(&b.name),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

/// One sort criterion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    /// Field to compare
    pub field: SortField,
    /// Largest first
    pub descending: bool,
}

impl SortKey {
    /// Ascending order on `field`.
    #[must_use]
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    /// Descending order on `field`.
    #[must_use]
    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Validated listing query.
#[derive(Clone, Debug, PartialEq)]
pub struct TourQuery {
    /// Only this difficulty
    pub difficulty: Option<Difficulty>,
    /// `price >= price_gte`
    pub price_gte: Option<f64>,
    /// `price <= price_lte`
    pub price_lte: Option<f64>,
    /// `ratings_average >= ratings_average_gte`
    pub ratings_average_gte: Option<f64>,
    /// `duration <= duration_lte`
    pub duration_lte: Option<u32>,
    /// Sort criteria, most significant first
    pub sort: Vec<SortKey>,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
}

impl Default for TourQuery {
    fn default() -> Self {
        Self {
            difficulty: None,
            price_gte: None,
            price_lte: None,
            ratings_average_gte: None,
            duration_lte: None,
            sort: vec![SortKey::desc(SortField::CreatedAt)],
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TourQuery {
    /// The five best-rated, cheapest tours.
    #[must_use]
    pub fn top_cheap() -> Self {
        Self {
            sort: vec![
                SortKey::desc(SortField::RatingsAverage),
                SortKey::asc(SortField::Price),
            ],
            limit: 5,
            ..Self::default()
        }
    }

    /// Rows to skip before the current page.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Whether `tour` passes every filter. Secret tours never do.
    #[must_use]
    pub fn matches(&self, tour: &Tour) -> bool {
        !tour.secret_tour
            && self.difficulty.is_none_or(|d| tour.difficulty == d)
            && self.price_gte.is_none_or(|p| tour.price >= p)
            && self.price_lte.is_none_or(|p| tour.price <= p)
            && self.ratings_average_gte.is_none_or(|r| tour.ratings_average >= r)
            && self.duration_lte.is_none_or(|d| tour.duration <= d)
    }

    /// Compare two tours under the sort criteria.
    #[must_use]
    pub fn compare(&self, a: &Tour, b: &Tour) -> Ordering {
        self.sort
            .iter()
            .map(|key| {
                let ordering = key.field.compare(a, b);
                if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    /// Filter, sort and paginate an in-memory collection.
    #[must_use]
    pub fn apply<'a, I>(&self, tours: I) -> Vec<Tour>
    where
        I: IntoIterator<Item = &'a Tour>,
    {
        let mut selected: Vec<Tour> = tours
            .into_iter()
            .filter(|tour| self.matches(tour))
            .cloned()
            .collect();
        selected.sort_by(|a, b| self.compare(a, b));
        selected
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Raw listing parameters as they arrive in the query string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TourQueryParams {
    /// `difficulty=easy`
    pub difficulty: Option<String>,
    /// `price[gte]=500`
    #[serde(rename = "price[gte]")]
    pub price_gte: Option<f64>,
    /// `price[lte]=1500`
    #[serde(rename = "price[lte]")]
    pub price_lte: Option<f64>,
    /// `ratingsAverage[gte]=4.7`
    #[serde(rename = "ratingsAverage[gte]")]
    pub ratings_average_gte: Option<f64>,
    /// `duration[lte]=7`
    #[serde(rename = "duration[lte]")]
    pub duration_lte: Option<u32>,
    /// `sort=-ratingsAverage,price`
    pub sort: Option<String>,
    /// `page=2`
    pub page: Option<u32>,
    /// `limit=10`
    pub limit: Option<u32>,
}

impl TryFrom<TourQueryParams> for TourQuery {
    type Error = Error;

    fn try_from(params: TourQueryParams) -> Result<Self> {
        let defaults = Self::default();

        let difficulty = params
            .difficulty
            .as_deref()
            .map(str::parse::<Difficulty>)
            .transpose()?;

        let sort = match params.sort.as_deref().map(str::trim) {
            None | Some("") => defaults.sort,
            Some(raw) => parse_sort(raw)?,
        };

        let page = params.page.unwrap_or(defaults.page);
        if page == 0 {
            return Err(Error::validation("page starts at 1"));
        }

        let limit = params.limit.unwrap_or(defaults.limit);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(Error::validation(format!("limit must be between 1 and {MAX_LIMIT}")));
        }

        Ok(Self {
            difficulty,
            price_gte: params.price_gte,
            price_lte: params.price_lte,
            ratings_average_gte: params.ratings_average_gte,
            duration_lte: params.duration_lte,
            sort,
            page,
            limit,
        })
    }
}

fn parse_sort(raw: &str) -> Result<Vec<SortKey>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.strip_prefix('-') {
            Some(name) => SortField::parse(name).map(SortKey::desc),
            None => SortField::parse(part).map(SortKey::asc),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tour::NewTour;
    use chrono::{Duration, Utc};

    fn tour(name: &str, price: f64, difficulty: Difficulty, age_days: i64) -> Tour {
        Tour::new(
            NewTour {
                name: name.into(),
                duration: 5,
                max_group_size: 10,
                difficulty,
                price,
                price_discount: None,
                summary: "summary".into(),
                description: None,
                start_dates: Vec::new(),
                secret_tour: false,
            },
            Utc::now() - Duration::days(age_days),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_sort_list() {
        let keys = parse_sort("-ratingsAverage, price").unwrap();
        assert_eq!(
            keys,
            vec![
                SortKey::desc(SortField::RatingsAverage),
                SortKey::asc(SortField::Price)
            ]
        );
        assert!(parse_sort("secretTour").is_err());
    }

    #[test]
    fn test_params_defaults() {
        let query = TourQuery::try_from(TourQueryParams::default()).unwrap();
        assert_eq!(query, TourQuery::default());
    }

    #[test]
    fn test_params_reject_bad_limit_and_difficulty() {
        let params = TourQueryParams {
            limit: Some(500),
            ..TourQueryParams::default()
        };
        assert!(TourQuery::try_from(params).is_err());

        let params = TourQueryParams {
            difficulty: Some("extreme".into()),
            ..TourQueryParams::default()
        };
        assert!(TourQuery::try_from(params).is_err());
    }

    #[test]
    fn test_apply_filters_sorts_and_paginates() {
        let tours = vec![
            tour("The Forest Hiker", 397.0, Difficulty::Easy, 3),
            tour("The Sea Explorer", 497.0, Difficulty::Medium, 2),
            tour("The Snow Adventurer", 997.0, Difficulty::Difficult, 1),
            tour("The City Wanderer", 1197.0, Difficulty::Easy, 0),
        ];

        let cheap = TourQuery {
            price_lte: Some(1000.0),
            sort: vec![SortKey::desc(SortField::Price)],
            ..TourQuery::default()
        };
        let names: Vec<_> = cheap.apply(&tours).into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["The Snow Adventurer", "The Sea Explorer", "The Forest Hiker"]
        );

        let second_page = TourQuery {
            page: 2,
            limit: 3,
            ..TourQuery::default()
        };
        let names: Vec<_> = second_page.apply(&tours).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["The Forest Hiker"]);
    }

    #[test]
    fn test_secret_tours_hidden() {
        let mut secret = tour("The Secret Valley", 100.0, Difficulty::Easy, 0);
        secret.secret_tour = true;
        assert!(TourQuery::default().apply([&secret]).is_empty());
    }
}
