//! Tour records.
//!
//! `ratings_average` and `ratings_quantity` are derived from reviews and are
//! absent from [`NewTour`] and [`TourPatch`]: the only way to
//! change them is [`crate::store::TourStore::set_ratings`].

use crate::error::{Error, Result};
use crate::ratings::{TourRatings, DEFAULT_RATINGS_AVERAGE};
use crate::types::TourId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest accepted tour name.
pub const NAME_MIN_LEN: usize = 10;
/// Longest accepted tour name.
pub const NAME_MAX_LEN: usize = 40;

/// How demanding a tour is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy
    Easy,
    /// Medium
    Medium,
    /// Difficult
    Difficult,
}

impl Difficulty {
    /// Wire and database name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Difficult => "difficult",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "difficult" => Ok(Self::Difficult),
            other => Err(Error::validation(format!(
                "difficulty must be easy, medium or difficult, got {other}"
            ))),
        }
    }
}

/// A bookable tour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    /// Tour id
    pub id: TourId,
    /// Unique display name
    pub name: String,
    /// URL-friendly form of the name
    pub slug: String,
    /// Length in days
    pub duration: u32,
    /// Maximum group size
    pub max_group_size: u32,
    /// Difficulty
    pub difficulty: Difficulty,
    /// Mean review rating (derived)
    pub ratings_average: f64,
    /// Number of reviews (derived)
    pub ratings_quantity: u32,
    /// Price per person
    pub price: f64,
    /// Optional discount, always below `price`
    pub price_discount: Option<f64>,
    /// One-line summary
    pub summary: String,
    /// Long description
    pub description: Option<String>,
    /// Scheduled start dates
    pub start_dates: Vec<DateTime<Utc>>,
    /// Hidden from listings and statistics
    pub secret_tour: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Tour {
    /// Build a tour from a validated payload with default ratings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the payload breaks a field rule.
    pub fn new(input: NewTour, created_at: DateTime<Utc>) -> Result<Self> {
        let name = input.name.trim().to_string();
        let tour = Self {
            id: TourId::new(),
            slug: slugify(&name),
            name,
            duration: input.duration,
            max_group_size: input.max_group_size,
            difficulty: input.difficulty,
            ratings_average: DEFAULT_RATINGS_AVERAGE,
            ratings_quantity: 0,
            price: input.price,
            price_discount: input.price_discount,
            summary: input.summary.trim().to_string(),
            description: input.description.map(|d| d.trim().to_string()),
            start_dates: input.start_dates,
            secret_tour: input.secret_tour,
            created_at,
        };
        tour.validate()?;
        Ok(tour)
    }

    /// Apply a user-facing edit, re-deriving the slug and re-validating.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the edited tour breaks a field rule;
    /// `self` is left untouched in that case.
    pub fn apply(&mut self, patch: TourPatch) -> Result<()> {
        let mut edited = self.clone();
        if let Some(name) = patch.name {
            edited.name = name.trim().to_string();
            edited.slug = slugify(&edited.name);
        }
        if let Some(duration) = patch.duration {
            edited.duration = duration;
        }
        if let Some(max_group_size) = patch.max_group_size {
            edited.max_group_size = max_group_size;
        }
        if let Some(difficulty) = patch.difficulty {
            edited.difficulty = difficulty;
        }
        if let Some(price) = patch.price {
            edited.price = price;
        }
        if let Some(price_discount) = patch.price_discount {
            edited.price_discount = price_discount;
        }
        if let Some(summary) = patch.summary {
            edited.summary = summary.trim().to_string();
        }
        if let Some(description) = patch.description {
            edited.description = description.map(|d| d.trim().to_string());
        }
        if let Some(start_dates) = patch.start_dates {
            edited.start_dates = start_dates;
        }
        if let Some(secret_tour) = patch.secret_tour {
            edited.secret_tour = secret_tour;
        }

        edited.validate()?;
        *self = edited;
        Ok(())
    }

    /// Current derived rating fields.
    #[must_use]
    pub const fn ratings(&self) -> TourRatings {
        TourRatings {
            ratings_average: self.ratings_average,
            ratings_quantity: self.ratings_quantity,
        }
    }

    /// Overwrite the derived rating fields.
    pub const fn set_ratings(&mut self, ratings: TourRatings) {
        self.ratings_average = ratings.ratings_average;
        self.ratings_quantity = ratings.ratings_quantity;
    }

    /// Duration expressed in weeks.
    #[must_use]
    pub fn duration_weeks(&self) -> f64 {
        f64::from(self.duration) / 7.0
    }

    /// Check every field rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first rule broken.
    pub fn validate(&self) -> Result<()> {
        let name_len = self.name.chars().count();
        if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
            return Err(Error::validation(format!(
                "a tour name must have between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"
            )));
        }
        if self.slug.is_empty() {
            return Err(Error::validation("a tour name must contain letters or digits"));
        }
        if self.duration == 0 {
            return Err(Error::validation("a tour must have a duration"));
        }
        if self.max_group_size == 0 {
            return Err(Error::validation("a tour must have a group size"));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::validation("a tour must have a positive price"));
        }
        if let Some(discount) = self.price_discount {
            if !discount.is_finite() || discount < 0.0 || discount >= self.price {
                return Err(Error::validation(format!(
                    "discount price ({discount}) should be below regular price"
                )));
            }
        }
        if self.summary.is_empty() {
            return Err(Error::validation("a tour must have a summary"));
        }
        Ok(())
    }
}

/// Request body for a new tour.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTour {
    /// Display name
    pub name: String,
    /// Length in days
    pub duration: u32,
    /// Maximum group size
    pub max_group_size: u32,
    /// Difficulty
    pub difficulty: Difficulty,
    /// Price per person
    pub price: f64,
    /// Optional discount
    #[serde(default)]
    pub price_discount: Option<f64>,
    /// One-line summary
    pub summary: String,
    /// Long description
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduled start dates
    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,
    /// Hidden from listings
    #[serde(default)]
    pub secret_tour: bool,
}

/// Partial update of a tour. Absent fields are left unchanged; for the
/// nullable fields `Some(None)` clears the value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPatch {
    /// New name (slug follows)
    #[serde(default)]
    pub name: Option<String>,
    /// New duration
    #[serde(default)]
    pub duration: Option<u32>,
    /// New group size
    #[serde(default)]
    pub max_group_size: Option<u32>,
    /// New difficulty
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// New price
    #[serde(default)]
    pub price: Option<f64>,
    /// New or cleared discount
    #[serde(default, with = "double_option")]
    pub price_discount: Option<Option<f64>>,
    /// New summary
    #[serde(default)]
    pub summary: Option<String>,
    /// New or cleared description
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    /// New start dates
    #[serde(default)]
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    /// New visibility
    #[serde(default)]
    pub secret_tour: Option<bool>,
}

/// Distinguishes a missing field (`None`) from an explicit `null`
/// (`Some(None)`).
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Lowercase the name and collapse every run of other characters into a
/// single `-`.
///
/// ```
/// use natours_core::tour::slugify;
///
/// assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
/// assert_eq!(slugify("  Sea & Sun: 2 days! "), "sea-sun-2-days");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
