//! Correlation id middleware.
//!
//! Every request gets a correlation id: the client's `X-Correlation-ID`
//! when it is a valid UUID, a fresh one otherwise. The id is stored in the
//! request extensions (read it with
//! [`CorrelationId`](crate::extractors::CorrelationId)), recorded on an
//! `http_request` span wrapping the handler, and echoed in the response
//! header.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/v1/tours", get(list_tours))
//!     .layer(axum::middleware::from_fn(track_correlation_id));
//! ```

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the correlation id in both directions.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Assign a correlation id, run the rest of the stack inside its span and
/// echo the id back.
pub async fn track_correlation_id(mut req: Request, next: Next) -> Response {
    let correlation_id = incoming_id(&req).unwrap_or_else(Uuid::new_v4);
    req.extensions_mut().insert(correlation_id);

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

fn incoming_id(req: &Request) -> Option<Uuid> {
    let raw = req.headers().get(CORRELATION_ID_HEADER)?.to_str().ok()?;
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::extractors::CorrelationId;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/echo", get(|id: CorrelationId| async move { id.0.to_string() }))
            .layer(axum::middleware::from_fn(track_correlation_id))
    }

    async fn echoed(header: Option<&str>) -> (String, String) {
        let mut builder = axum::http::Request::builder().uri("/echo");
        if let Some(value) = header {
            builder = builder.header(CORRELATION_ID_HEADER, value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let returned = response.headers()[CORRELATION_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (returned, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn fresh_id_when_header_missing() {
        let (header, seen_by_handler) = echoed(None).await;

        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(header, seen_by_handler);
    }

    #[tokio::test]
    async fn client_id_is_kept() {
        let id = Uuid::new_v4().to_string();
        let (header, seen_by_handler) = echoed(Some(&id)).await;

        assert_eq!(header, id);
        assert_eq!(seen_by_handler, id);
    }

    #[tokio::test]
    async fn garbage_header_is_replaced() {
        let (header, _) = echoed(Some("not-a-uuid")).await;

        assert_ne!(header, "not-a-uuid");
        assert!(Uuid::parse_str(&header).is_ok());
    }
}
