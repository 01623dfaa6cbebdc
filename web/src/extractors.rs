//! Custom Axum extractors.
//!
//! - [`Authenticated`]: the acting user, from a verified bearer token
//! - [`CorrelationId`]: the request's correlation id
//!
//! # Example
//!
//! ```ignore
//! async fn delete_review(
//!     Authenticated(actor): Authenticated,
//!     correlation_id: CorrelationId,
//!     Path(id): Path<ReviewId>,
//! ) -> Result<StatusCode, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, user_id = %actor.user_id, "Deleting review");
//!     // ...
//! }
//! ```

use crate::auth::{AuthError, JwtVerifier};
use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use natours_core::types::Actor;
use std::sync::Arc;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Taken from the request extensions when the correlation middleware ran,
/// otherwise from the `X-Correlation-ID` header, otherwise freshly
/// generated.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts.extensions.get::<Uuid>().copied().unwrap_or_else(|| {
            parts
                .headers
                .get(CORRELATION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| Uuid::parse_str(s).ok())
                .unwrap_or_else(Uuid::new_v4)
        });

        Ok(Self(correlation_id))
    }
}

/// The authenticated caller.
///
/// Rejects with 401 when the `Authorization: Bearer` header is missing or
/// its token does not verify. Role checks happen in the services.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    Arc<JwtVerifier>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<JwtVerifier>::from_ref(state);

        let result = bearer_token(parts)
            .ok_or(AuthError::MissingToken)
            .and_then(|token| verifier.verify(token));

        match result {
            Ok(actor) => Ok(Self(actor)),
            Err(error) => {
                tracing::debug!(error = %error, "Rejected bearer token");
                Err(AppError::unauthorized(error.to_string()))
            },
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use axum::http::{Request, StatusCode};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use natours_core::types::{Role, UserId};

    const SECRET: &[u8] = b"extractor-secret";

    #[derive(Clone)]
    struct TestState(Arc<JwtVerifier>);

    impl FromRef<TestState> for Arc<JwtVerifier> {
        fn from_ref(state: &TestState) -> Self {
            state.0.clone()
        }
    }

    fn state() -> TestState {
        TestState(Arc::new(JwtVerifier::new(SECRET)))
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let req = Request::builder()
            .header(CORRELATION_ID_HEADER, uuid.to_string())
            .body(())
            .expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn test_correlation_id_prefers_extension() {
        let from_middleware = Uuid::new_v4();
        let req = Request::builder()
            .header(CORRELATION_ID_HEADER, Uuid::new_v4().to_string())
            .body(())
            .expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        parts.extensions.insert(from_middleware);
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, from_middleware);
    }

    #[tokio::test]
    async fn test_authenticated_from_bearer_token() {
        let user = UserId::new();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user,
            role: Role::User,
            exp: now + 600,
            iat: now,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

        let req = Request::builder()
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();

        let Authenticated(actor) = Authenticated::from_request_parts(&mut parts, &state())
            .await
            .unwrap();
        assert_eq!(actor.user_id, user);
        assert_eq!(actor.role, Role::User);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let req = Request::builder().body(()).unwrap();
        let (mut parts, ()) = req.into_parts();

        let rejection = Authenticated::from_request_parts(&mut parts, &state())
            .await
            .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let req = Request::builder()
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();
        let (mut parts, ()) = req.into_parts();

        let rejection = Authenticated::from_request_parts(&mut parts, &state())
            .await
            .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }
}
