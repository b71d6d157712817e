//! Bearer token authentication for the admin API.

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::web::error::ApiError;

/// Admin token shared with the auth middleware.
///
/// Only the SHA-256 digest is kept in memory after construction.
#[derive(Clone)]
pub struct AdminToken {
    digest: Option<[u8; 32]>,
}

impl AdminToken {
    /// Build from the configured token. A missing or blank token rejects everything.
    pub fn new(token: Option<&str>) -> Self {
        let digest = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(digest_of);
        Self { digest }
    }

    /// Compare a presented token against the configured one.
    ///
    /// Digests are compared without early exit so timing does not reveal
    /// how much of the token matched.
    pub fn verify(&self, presented: &str) -> bool {
        let Some(expected) = self.digest else {
            return false;
        };
        let actual = digest_of(presented);
        expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminToken")
            .field("configured", &self.digest.is_some())
            .finish()
    }
}

fn digest_of(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Reject requests that do not carry the admin bearer token.
pub async fn admin_auth(
    admin_token: Arc<AdminToken>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

    if !admin_token.verify(token) {
        tracing::warn!(
            "Rejected admin API request to {} with an invalid token",
            request.uri().path()
        );
        return Err(ApiError::unauthorized("Invalid admin token"));
    }

    Ok(next.run(request).await)
}
