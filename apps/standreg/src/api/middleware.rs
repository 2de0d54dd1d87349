//! # Rate Limiting
//!
//! A single process-wide limiter (governor's direct, not-keyed variant)
//! shared by all routes. `STANDREG_RATE_LIMIT` sets the per-second quota;
//! `0` disables the layer entirely (the router skips it, see
//! [`super::create_router`]).

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Fallback quota when the configured value is unusable.
const DEFAULT_RPS: NonZeroU32 = NonZeroU32::new(100).unwrap();

/// Shared limiter handed to the middleware layer as state.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build the shared limiter. A zero rate falls back to the default quota;
/// callers that want no limiting skip the layer instead.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(DEFAULT_RPS);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Requests per second from `STANDREG_RATE_LIMIT`; unset or unparsable
/// values mean the default.
pub fn get_rate_limit_from_env() -> u32 {
    std::env::var("STANDREG_RATE_LIMIT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RPS.get())
}

/// Rejects with 429 once the shared quota is exhausted.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if limiter.check().is_err() {
        tracing::warn!(event = "rate_limited", path = %request.uri().path());
        return Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"));
    }
    Ok(next.run(request).await)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_admits_within_quota() {
        let limiter = create_rate_limiter(50);
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_zero_rate_falls_back_to_default() {
        let limiter = create_rate_limiter(0);
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_burst_beyond_quota_is_refused() {
        let limiter = create_rate_limiter(1);
        assert!(limiter.check().is_ok());
        // The second request within the same second exceeds the burst.
        assert!(limiter.check().is_err());
    }
}
