//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API, plus the
//! mapping from [`RegistryError`] to HTTP status codes.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use standreg_core::{ImportReport, Jurisdiction, RegistryError};

/// Remove `null` members from a serialized entity, recursively.
///
/// Optional fields are absent, not null, everywhere the registry emits
/// JSON. The model types serialize every field so that non-self-describing
/// storage encodings stay intact; the stripping happens here at the output
/// boundary instead.
pub fn strip_nulls(value: &mut serde_json::Value) {
    if let Some(map) = value.as_object_mut() {
        map.retain(|_, v| !v.is_null());
        for v in map.values_mut() {
            strip_nulls(v);
        }
    } else if let Some(items) = value.as_array_mut() {
        for v in items {
            strip_nulls(v);
        }
    }
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Registry status response: row counts per entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub persistent: bool,
    pub jurisdictions: usize,
    pub vocabularies: usize,
    pub terms: usize,
    pub term_relations: usize,
    pub documents: usize,
    pub standard_nodes: usize,
    pub crosswalks: usize,
    pub standard_node_relations: usize,
    pub collections: usize,
    pub content_nodes: usize,
    pub correlations: usize,
    pub content_standard_relations: usize,
}

// =============================================================================
// JURISDICTION LIST RESPONSE
// =============================================================================

/// The tenant directory served at `/`.
#[derive(Debug, Clone, Serialize)]
pub struct JurisdictionListResponse {
    pub jurisdictions: Vec<JurisdictionEntry>,
}

/// One row in the tenant directory.
#[derive(Debug, Clone, Serialize)]
pub struct JurisdictionEntry {
    pub name: String,
    pub display_name: String,
    pub uri: String,
}

impl From<Jurisdiction> for JurisdictionEntry {
    fn from(j: Jurisdiction) -> Self {
        let uri = j.uri();
        Self {
            name: j.name,
            display_name: j.display_name,
            uri,
        }
    }
}

// =============================================================================
// CREATION RESPONSES
// =============================================================================

/// Response for single-entity creation endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    /// Canonical URI of the created entity.
    pub uri: String,
    /// The created row as stored.
    pub entity: serde_json::Value,
}

/// Response for tree and vocabulary import endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    /// Canonical URI of the imported owner entity.
    pub uri: String,
    pub report: ImportReport,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Error payload returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Map a registry error to an HTTP status plus client-visible message.
///
/// Cross-tenant references deliberately collapse into a generic 404 so a
/// caller cannot distinguish "no such id" from "someone else's id" and
/// enumerate identifiers across jurisdictions.
pub fn error_status(err: &RegistryError) -> (StatusCode, ErrorResponse) {
    match err {
        RegistryError::InvalidSegment(_) | RegistryError::Validation(_) => {
            (StatusCode::BAD_REQUEST, ErrorResponse::new(err.to_string()))
        }
        RegistryError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new(format!("Not found: {}", what)),
        ),
        RegistryError::CrossTenantReference(_) => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Not found".to_string()),
        ),
        RegistryError::DuplicateRoot(_) | RegistryError::Conflict(_) => {
            (StatusCode::CONFLICT, ErrorResponse::new(err.to_string()))
        }
        RegistryError::FormatUnsupported(suffix) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorResponse::new(format!("Unsupported representation: {}", suffix)),
        ),
        RegistryError::SerializationError(_) | RegistryError::IoError(_) => {
            tracing::error!("internal registry error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal error".to_string()),
            )
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_tenant_errors_look_like_not_found() {
        let (status, body) = error_status(&RegistryError::CrossTenantReference(
            "SabcdEFGH".to_string(),
        ));
        assert_eq!(status, StatusCode::NOT_FOUND);
        // The id must not leak into the message.
        assert!(!body.error.contains("SabcdEFGH"));
    }

    #[test]
    fn duplicate_root_is_a_conflict() {
        let (status, _) = error_status(&RegistryError::DuplicateRoot("D123".to_string()));
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn unknown_suffix_is_unsupported_media_type() {
        let (status, body) = error_status(&RegistryError::FormatUnsupported("xml".to_string()));
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body.error.contains("xml"));
    }
}
