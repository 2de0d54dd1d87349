//! # Standreg HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Registry row counts
//! - `GET /` - List jurisdictions
//! - `POST /jurisdictions` - Create a jurisdiction
//! - `POST /{juri}/terms` - Import a vocabulary with its terms
//! - `POST /{juri}/terms/{vocab}` - Append terms to an existing vocabulary
//! - `POST /{juri}/documents` - Import a standards document tree
//! - `POST /{juri}/contentcollections` - Import a content collection tree
//! - `POST /{juri}/standardnodes` - Create a single standard node
//! - `POST /{juri}/contentnodes` - Create a single content node
//! - `POST /{juri}/termrels` - Create a term relation
//! - `POST /{juri}/standardscrosswalks` - Create a crosswalk
//! - `POST /{juri}/standardnoderels` - Create a crosswalk edge
//! - `POST /{juri}/contentcorrelations` - Create a correlation
//! - `POST /{juri}/contentstandardrels` - Create a correlation edge
//!
//! Creation payloads may reference other entities by canonical URI instead
//! of id; such references are resolved before the row is created.
//!
//! - `GET /{juri}`, `GET /{juri}/...` - Resolve any canonical URI
//!   (an optional `.json` / `.html` suffix, or the `Accept` header,
//!   selects the representation)
//! - `DELETE /{juri}`, `DELETE /{juri}/...` - Delete by canonical URI
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `STANDREG_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `STANDREG_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `STANDREG_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod render;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `standreg::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    add_terms_handler, create_jurisdiction_handler, create_resource_handler, delete_handler,
    delete_rest_handler, delete_vocabulary_handler, health_handler, import_collection_handler,
    import_document_handler, import_vocabulary_handler, jurisdictions_handler, resolve_handler,
    resolve_root_handler, resolve_vocabulary_handler, status_handler,
};
#[allow(unused_imports)]
pub use types::{
    CreatedResponse, ErrorResponse, HealthResponse, ImportResponse, JurisdictionListResponse,
    StatusResponse,
};
pub use types::strip_nulls;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use standreg_core::{Registry, RegistryError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the registry.
#[derive(Clone)]
pub struct AppState {
    /// The registry behind a read/write lock: resolution takes read locks,
    /// imports and deletes take the write lock.
    pub registry: Arc<RwLock<Registry>>,
}

impl AppState {
    /// Create new app state around a registry.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `STANDREG_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("STANDREG_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (STANDREG_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in STANDREG_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No STANDREG_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key (if configured)
///
/// Fixed-path creation routes (static second segment like `terms`) coexist
/// with the `/{jurisdiction}/{*rest}` wildcard and win for their exact
/// paths. A parameter route cannot share the position with the wildcard,
/// so single-resource creation rides the wildcard's POST method and
/// dispatches on the captured plural inside the handler.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    // Check if rate limiting is enabled
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Check if authentication is enabled
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set STANDREG_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/", get(handlers::jurisdictions_handler))
        .route("/jurisdictions", post(handlers::create_jurisdiction_handler))
        .route(
            "/{jurisdiction}/terms",
            post(handlers::import_vocabulary_handler),
        )
        // This path must carry GET and DELETE itself: registering any route
        // here takes the path away from the wildcard resolver below.
        .route(
            "/{jurisdiction}/terms/{vocabulary}",
            post(handlers::add_terms_handler)
                .get(handlers::resolve_vocabulary_handler)
                .delete(handlers::delete_vocabulary_handler),
        )
        .route(
            "/{jurisdiction}/documents",
            post(handlers::import_document_handler),
        )
        .route(
            "/{jurisdiction}/contentcollections",
            post(handlers::import_collection_handler),
        )
        .route(
            "/{jurisdiction}",
            get(handlers::resolve_root_handler).delete(handlers::delete_handler),
        )
        .route(
            "/{jurisdiction}/{*rest}",
            get(handlers::resolve_handler)
                .delete(handlers::delete_rest_handler)
                .post(handlers::create_resource_handler),
        );

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(8 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, registry: Registry) -> Result<(), RegistryError> {
    let state = AppState::new(registry);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RegistryError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Standreg HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| RegistryError::IoError(format!("Server error: {}", e)))
}
