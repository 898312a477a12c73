// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access tokens: issuance, verification, and the middleware that requires one.
//!
//! Tokens are stateless HS256 JWTs. There is no revocation list; a token is
//! valid until its `exp` instant and rejected from then on.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Authenticated email
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

fn unix_now() -> anyhow::Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Create an access token for `email` that expires `ttl` from now.
///
/// Sub-second lifetimes are rounded up to a whole second.
pub fn create_jwt(email: &str, signing_key: &[u8], ttl: Duration) -> anyhow::Result<String> {
    let now = unix_now()?;
    let ttl_secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);

    let claims = Claims {
        email: email.to_string(),
        iat: now,
        exp: now.saturating_add(ttl_secs),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify signature and expiry of an access token and return its claims.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    decode::<Claims>(token, &DecodingKey::from_secret(signing_key), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::Unauthorized
        })
}

/// Middleware that requires a valid `Authorization: Bearer` access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_jwt(token, &state.config.jwt_signing_key)?;

    request.extensions_mut().insert(AuthUser {
        email: claims.email,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    #[test]
    fn test_token_carries_email_and_expiry() {
        let token = create_jwt("ada@example.com", KEY, Duration::from_secs(3600)).unwrap();
        let claims = verify_jwt(&token, KEY).unwrap();

        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_subsecond_ttl_rounds_up() {
        let token = create_jwt("ada@example.com", KEY, Duration::from_millis(1500)).unwrap();
        let claims = verify_jwt(&token, KEY).unwrap();
        assert_eq!(claims.exp - claims.iat, 2);
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let token = create_jwt("ada@example.com", KEY, Duration::from_secs(60)).unwrap();
        let err = verify_jwt(&token, b"another_key_that_is_long_enough!").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
