//! # API Key Authentication
//!
//! Optional shared-secret authentication for the HTTP API. When
//! `STANDREG_API_KEY` is set, every request except `GET /health` must carry
//! the key in the `Authorization` header (`Bearer <key>` or the bare key);
//! when it is unset the API is open.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// The configured API key, if any. An empty value counts as unset so that
/// `STANDREG_API_KEY=""` does not lock the API behind an empty secret.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("STANDREG_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Constant-time key comparison.
///
/// Both sides are padded to a common length before `ct_eq` so the compare
/// always touches the same number of bytes; the length check happens after,
/// on top of an already constant-time result.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    let width = provided.len().max(expected.len());
    let mut lhs = vec![0u8; width];
    let mut rhs = vec![0u8; width];
    lhs[..provided.len()].copy_from_slice(provided);
    rhs[..expected.len()].copy_from_slice(expected);
    let bytes_equal: bool = lhs.ct_eq(&rhs).into();
    bytes_equal && provided.len() == expected.len()
}

fn reject(reason: &'static str) -> (StatusCode, &'static str) {
    tracing::warn!(event = "auth_failure", reason, "request rejected");
    (StatusCode::UNAUTHORIZED, "Unauthorized")
}

/// Authentication middleware. Runs innermost, after rate limiting.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    // Health checks stay unauthenticated so load balancers can reach them.
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let Some(header_value) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Err(reject("missing_authorization_header"));
    };

    let provided = header_value.strip_prefix("Bearer ").unwrap_or(header_value);
    if keys_match(provided.as_bytes(), expected.as_bytes()) {
        Ok(next.run(request).await)
    } else {
        Err(reject("invalid_api_key"))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_api_key_empty_returns_none() {
        // SAFETY: This is a unit test running in isolation.
        unsafe { std::env::remove_var("STANDREG_API_KEY") };
        assert!(get_api_key_from_env().is_none());
    }

    #[test]
    fn test_keys_match_requires_exact_bytes() {
        assert!(keys_match(b"sekrit", b"sekrit"));
        assert!(!keys_match(b"sekrit", b"sekrit2"));
        assert!(!keys_match(b"", b"sekrit"));
        // A prefix padded with NULs must not pass the length check.
        assert!(!keys_match(b"sek", b"sekrit"));
    }
}
