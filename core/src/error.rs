//! Error types for Natours domain and store operations.

use thiserror::Error;

/// Result type alias for Natours operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by services and store implementations.
///
/// Store backends translate their driver errors into these variants so the
/// web layer can map them to HTTP statuses without knowing the backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The requested tour, review or user does not exist.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Kind of resource ("Tour", "Review")
        resource: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Input rejected before reaching a store.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A user tried to review the same tour twice.
    #[error("User {user} has already reviewed tour {tour}")]
    DuplicateReview {
        /// Tour being reviewed
        tour: String,
        /// Author of the existing review
        user: String,
    },

    /// Another unique constraint was violated (e.g. tour name).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The actor is authenticated but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backing store could not be reached or failed mid-operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] on any displayable id.
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
