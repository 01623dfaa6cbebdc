//! Test data builders.

#![allow(clippy::missing_panics_doc)] // Fixtures only panic on hardcoded data

use natours_core::review::NewReview;
use natours_core::tour::{Difficulty, NewTour};
use natours_core::types::{Actor, Rating, Role, UserId};

/// A valid star rating.
///
/// # Panics
///
/// Panics if `value` is outside `1..=5`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn stars(value: u8) -> Rating {
    Rating::new(value).expect("fixture ratings are between 1 and 5")
}

/// A review payload with the given rating.
#[must_use]
pub fn review_input(rating: u8) -> NewReview {
    NewReview {
        body: format!("{rating} stars, would book again"),
        rating: stars(rating),
    }
}

/// A valid tour payload named `name` (10 to 40 characters).
#[must_use]
pub fn tour_input(name: &str) -> NewTour {
    NewTour {
        name: name.to_string(),
        duration: 5,
        max_group_size: 25,
        difficulty: Difficulty::Easy,
        price: 397.0,
        price_discount: None,
        summary: "Breathtaking hike through the Canadian Banff National Park".into(),
        description: None,
        start_dates: Vec::new(),
        secret_tour: false,
    }
}

/// A fresh customer allowed to write reviews.
#[must_use]
pub fn customer() -> Actor {
    Actor::new(UserId::new(), Role::User)
}

/// A fresh administrator.
#[must_use]
pub fn admin() -> Actor {
    Actor::new(UserId::new(), Role::Admin)
}

/// A fresh lead guide.
#[must_use]
pub fn lead_guide() -> Actor {
    Actor::new(UserId::new(), Role::LeadGuide)
}
