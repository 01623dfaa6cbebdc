//! HTTP request handlers, one module per resource.

pub mod health;
pub mod reviews;
pub mod tours;

pub use health::{health_check, readiness};
