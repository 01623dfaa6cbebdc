//! Bearer token verification.
//!
//! Tokens are issued elsewhere; this service only checks them. A valid
//! token is an HS256 JWT signed with the shared secret whose claims name
//! the user and their role:
//!
//! ```json
//! { "sub": "2f1c…", "role": "lead-guide", "iat": 1735689600, "exp": 1735776000 }
//! ```

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use natours_core::types::{Actor, Role, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    pub sub: UserId,
    /// Role of the user when the token was issued
    pub role: Role,
    /// Expiry (seconds since the epoch)
    pub exp: i64,
    /// Issue time (seconds since the epoch)
    pub iat: i64,
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        Self::new(claims.sub, claims.role)
    }
}

/// Why a request could not be authenticated.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header.
    #[error("You are not logged in, please log in to get access")]
    MissingToken,

    /// The token is past its `exp`.
    #[error("Your token has expired, please log in again")]
    Expired,

    /// Bad signature, malformed token or unexpected claims.
    #[error("Invalid token, please log in again")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Verifies access tokens against the shared HS256 secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl JwtVerifier {
    /// Create a verifier for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Check the signature and expiry of `token` and return its actor.
    ///
    /// # Errors
    ///
    /// [`AuthError::Expired`] or [`AuthError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<Actor, AuthError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid(e),
            })
    }
}
