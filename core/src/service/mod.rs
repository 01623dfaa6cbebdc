//! Use cases composed from the store traits.

pub mod reviews;
pub mod tours;

pub use reviews::{Recomputation, ReviewService, RECOMPUTATIONS_METRIC};
pub use tours::TourService;
