// 🔐 Bearer token check for write routes
//
// Tokens are compared by SHA-256 digest so the comparison time does not
// depend on how much of the token matched.

use super::error::ApiError;
use super::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use tracing::debug;

pub fn token_digest(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

/// Token from an `Authorization: Bearer <token>` value; the scheme is
/// matched case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

pub async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    // No configured token: writes are closed
    let Some(expected) = state.token_digest.as_deref() else {
        debug!("write rejected, no API token configured");
        return ApiError::Unauthorized.into_response();
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    match presented {
        Some(token) if token_digest(token) == expected => next.run(request).await,
        _ => ApiError::Unauthorized.into_response(),
    }
}
