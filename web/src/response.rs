//! Success envelope.
//!
//! ```json
//! { "status": "success", "results": 2, "data": [ … ] }
//! ```
//!
//! `results` is only present for lists.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// `{"status":"success", …}` body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<usize>,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a single item.
    #[must_use]
    pub const fn item(data: T) -> Self {
        Self {
            status: "success",
            results: None,
            data,
        }
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    /// Wrap a list and count it.
    #[must_use]
    pub fn list(data: Vec<T>) -> Self {
        Self {
            status: "success",
            results: Some(data.len()),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

/// 201 with the created item.
pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Envelope::item(data))
}
