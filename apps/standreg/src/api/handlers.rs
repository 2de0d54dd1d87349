//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! GET and DELETE are resolver-driven: the request path *is* the canonical
//! URI, so one pair of handlers covers every addressable entity. POST
//! handlers are per-resource because their payloads differ.

use super::{
    AppState, render,
    types::{
        CreatedResponse, ErrorResponse, HealthResponse, ImportResponse, JurisdictionEntry,
        JurisdictionListResponse, StatusResponse, error_status,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use standreg_core::{
    CollectionImport, DocumentImport, ImportOptions, ImportReport, NewContentNode,
    NewContentStandardRelation, NewCorrelation, NewCrosswalk, NewJurisdiction, NewStandardNode,
    NewStandardNodeRelation, NewTermRelation, Registry, RegistryError, Resolved, VocabularyImport,
    ingest::TermRecord,
    resolve::{self, Format},
};

/// Render a registry error as its HTTP response.
fn err(e: &RegistryError) -> Response {
    let (status, body) = error_status(e);
    (status, Json(body)).into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get registry row counts.
pub async fn status_handler(State(state): State<AppState>) -> Response {
    let registry = state.registry.read().await;
    match registry.counts() {
        Ok(c) => Json(StatusResponse {
            persistent: registry.is_persistent(),
            jurisdictions: c.jurisdictions,
            vocabularies: c.vocabularies,
            terms: c.terms,
            term_relations: c.term_relations,
            documents: c.documents,
            standard_nodes: c.standard_nodes,
            crosswalks: c.crosswalks,
            standard_node_relations: c.standard_node_relations,
            collections: c.collections,
            content_nodes: c.content_nodes,
            correlations: c.correlations,
            content_standard_relations: c.content_standard_relations,
        })
        .into_response(),
        Err(e) => err(&e),
    }
}

// =============================================================================
// JURISDICTION DIRECTORY
// =============================================================================

/// List all jurisdictions (the tenant directory at `/`).
pub async fn jurisdictions_handler(State(state): State<AppState>) -> Response {
    let registry = state.registry.read().await;
    match registry.list_jurisdictions() {
        Ok(rows) => Json(JurisdictionListResponse {
            jurisdictions: rows.into_iter().map(JurisdictionEntry::from).collect(),
        })
        .into_response(),
        Err(e) => err(&e),
    }
}

// =============================================================================
// RESOLUTION HANDLERS
// =============================================================================

/// Resolve `/{jurisdiction}`.
pub async fn resolve_root_handler(
    State(state): State<AppState>,
    Path(jurisdiction): Path<String>,
    headers: HeaderMap,
) -> Response {
    resolve_uri_response(&state, &format!("/{}", jurisdiction), &headers).await
}

/// Resolve any deeper canonical URI (greedy tail).
pub async fn resolve_handler(
    State(state): State<AppState>,
    Path((jurisdiction, rest)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    resolve_uri_response(&state, &format!("/{}/{}", jurisdiction, rest), &headers).await
}

/// Format for a suffix-less URI: `Accept: text/html` selects the HTML
/// rendering, anything else gets JSON.
fn format_from_accept(headers: &HeaderMap) -> Format {
    let wants_html = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"));
    if wants_html { Format::Html } else { Format::Json }
}

/// The shared resolution path: parse, resolve, and render. A URI suffix
/// wins over the `Accept` header; neither changes which entity is
/// addressed, only the representation.
async fn resolve_uri_response(state: &AppState, uri: &str, headers: &HeaderMap) -> Response {
    let registry = state.registry.read().await;

    let parsed = match resolve::parse_uri(uri) {
        Ok(p) => p,
        Err(e) => return err(&e),
    };
    let entity = match resolve::resolve(registry.store(), &parsed.target) {
        Ok(entity) => entity,
        Err(e) => return err(&e),
    };
    let canonical = match registry.canonical_uri(&entity) {
        Ok(uri) => uri,
        Err(e) => return err(&e),
    };
    let links = match registry.links(&entity) {
        Ok(links) => links,
        Err(e) => return err(&e),
    };
    let mut value = match serde_json::to_value(&entity) {
        Ok(v) => v,
        Err(e) => return err(&RegistryError::SerializationError(e.to_string())),
    };
    super::types::strip_nulls(&mut value);

    match parsed.format.unwrap_or_else(|| format_from_accept(headers)) {
        Format::Json => {
            let mut value = value;
            if let Some(map) = value.as_object_mut() {
                map.insert("uri".to_string(), serde_json::Value::String(canonical));
                let link_map: serde_json::Map<String, serde_json::Value> = links
                    .iter()
                    .map(|l| {
                        (
                            l.field.to_string(),
                            serde_json::Value::String(l.uri.clone()),
                        )
                    })
                    .collect();
                map.insert("links".to_string(), serde_json::Value::Object(link_map));
            }
            Json(value).into_response()
        }
        Format::Html => Html(render::entity_page(&canonical, &value, &links)).into_response(),
    }
}

// =============================================================================
// DELETION HANDLERS
// =============================================================================

/// Delete `/{jurisdiction}` (cascades to everything the tenant owns).
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(jurisdiction): Path<String>,
) -> Response {
    delete_uri_response(&state, &format!("/{}", jurisdiction)).await
}

/// Delete any deeper canonical URI. Node deletes take their subtree.
pub async fn delete_rest_handler(
    State(state): State<AppState>,
    Path((jurisdiction, rest)): Path<(String, String)>,
) -> Response {
    delete_uri_response(&state, &format!("/{}/{}", jurisdiction, rest)).await
}

async fn delete_uri_response(state: &AppState, uri: &str) -> Response {
    let mut registry = state.registry.write().await;
    match registry.delete(uri) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => err(&e),
    }
}

// =============================================================================
// JURISDICTION CREATION
// =============================================================================

/// Create a jurisdiction.
pub async fn create_jurisdiction_handler(
    State(state): State<AppState>,
    Json(new): Json<NewJurisdiction>,
) -> Response {
    let mut registry = state.registry.write().await;
    match registry.create_jurisdiction(new) {
        Ok(juri) => created(&registry, &Resolved::Jurisdiction(juri)),
        Err(e) => err(&e),
    }
}

// =============================================================================
// IMPORT HANDLERS
// =============================================================================

/// Import a vocabulary with its terms under `/{jurisdiction}/terms`.
///
/// `?require_parent_rows=true` makes sparse term paths (a child whose
/// parent has no row) fail the whole run instead of being accepted.
pub async fn import_vocabulary_handler(
    State(state): State<AppState>,
    Path(jurisdiction): Path<String>,
    Query(options): Query<ImportOptions>,
    Json(import): Json<VocabularyImport>,
) -> Response {
    let mut registry = state.registry.write().await;
    match registry.import_vocabulary(&jurisdiction, import, &options) {
        Ok((vocab, report)) => imported(&registry, &Resolved::Vocabulary(vocab), report),
        Err(e) => err(&e),
    }
}

/// Append terms to an existing vocabulary under
/// `/{jurisdiction}/terms/{vocabulary}`. The body is a JSON array of term
/// records.
pub async fn add_terms_handler(
    State(state): State<AppState>,
    Path((jurisdiction, vocabulary)): Path<(String, String)>,
    Query(options): Query<ImportOptions>,
    Json(terms): Json<Vec<TermRecord>>,
) -> Response {
    let mut registry = state.registry.write().await;
    match registry.add_terms(&jurisdiction, &vocabulary, terms, &options) {
        Ok((vocab, report)) => imported(&registry, &Resolved::Vocabulary(vocab), report),
        Err(e) => err(&e),
    }
}

/// Resolve a vocabulary by its canonical URI. The explicit route exists so
/// that term appends can share the path; the greedy resolver covers every
/// deeper term URI.
pub async fn resolve_vocabulary_handler(
    State(state): State<AppState>,
    Path((jurisdiction, vocabulary)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    resolve_uri_response(
        &state,
        &format!("/{}/terms/{}", jurisdiction, vocabulary),
        &headers,
    )
    .await
}

/// Delete a vocabulary and everything it holds.
pub async fn delete_vocabulary_handler(
    State(state): State<AppState>,
    Path((jurisdiction, vocabulary)): Path<(String, String)>,
) -> Response {
    delete_uri_response(&state, &format!("/{}/terms/{}", jurisdiction, vocabulary)).await
}

/// Import a standards document tree under `/{jurisdiction}/documents`.
pub async fn import_document_handler(
    State(state): State<AppState>,
    Path(jurisdiction): Path<String>,
    Json(import): Json<DocumentImport>,
) -> Response {
    let mut registry = state.registry.write().await;
    match registry.import_document(&jurisdiction, import) {
        Ok((doc, report)) => imported(&registry, &Resolved::Document(doc), report),
        Err(e) => err(&e),
    }
}

/// Import a content collection tree under `/{jurisdiction}/contentcollections`.
pub async fn import_collection_handler(
    State(state): State<AppState>,
    Path(jurisdiction): Path<String>,
    Json(import): Json<CollectionImport>,
) -> Response {
    let mut registry = state.registry.write().await;
    match registry.import_collection(&jurisdiction, import) {
        Ok((coll, report)) => imported(&registry, &Resolved::Collection(coll), report),
        Err(e) => err(&e),
    }
}

// =============================================================================
// SINGLE-RESOURCE CREATION
// =============================================================================

/// Create one entity under `/{jurisdiction}/{resource-plural}`.
///
/// Rides the POST method of the wildcard route, so `resource` is the
/// captured tail: a single plural segment dispatches to the matching
/// payload type, anything deeper addresses no creation endpoint. The
/// vocabulary/document/collection plurals are handled by the dedicated
/// import routes and never reach this handler.
pub async fn create_resource_handler(
    State(state): State<AppState>,
    Path((jurisdiction, resource)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if resource.contains('/') {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "No such resource collection: {}",
                resource
            ))),
        )
            .into_response();
    }
    let mut registry = state.registry.write().await;
    let body = match resolve_inbound_refs(&registry, body) {
        Ok(b) => b,
        Err(e) => return err(&e),
    };
    let result = match resource.as_str() {
        "termrels" => parse_payload::<NewTermRelation>(body)
            .and_then(|new| registry.create_term_relation(&jurisdiction, new))
            .map(Resolved::TermRelation),
        "standardscrosswalks" => parse_payload::<NewCrosswalk>(body)
            .and_then(|new| registry.create_crosswalk(&jurisdiction, new))
            .map(Resolved::Crosswalk),
        "standardnoderels" => parse_payload::<NewStandardNodeRelation>(body)
            .and_then(|new| registry.create_standard_node_relation(&jurisdiction, new))
            .map(Resolved::StandardNodeRelation),
        "contentcorrelations" => parse_payload::<NewCorrelation>(body)
            .and_then(|new| registry.create_correlation(&jurisdiction, new))
            .map(Resolved::Correlation),
        "contentstandardrels" => parse_payload::<NewContentStandardRelation>(body)
            .and_then(|new| registry.create_content_standard_relation(&jurisdiction, new))
            .map(Resolved::ContentStandardRelation),
        "standardnodes" => parse_payload::<NewStandardNode>(body)
            .and_then(|new| registry.create_standard_node(&jurisdiction, new))
            .map(Resolved::StandardNode),
        "contentnodes" => parse_payload::<NewContentNode>(body)
            .and_then(|new| registry.create_content_node(&jurisdiction, new))
            .map(Resolved::ContentNode),
        other => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!(
                    "No such resource collection: {}",
                    other
                ))),
            )
                .into_response();
        }
    };
    match result {
        Ok(entity) => created(&registry, &entity),
        Err(e) => err(&e),
    }
}

/// Inbound reference mapping: creation payloads may name another entity by
/// its canonical URI instead of its id. URI-shaped string fields are
/// resolved and replaced by the referenced entity's id before the payload
/// is deserialized. `target_uri` is exempt: it holds external references
/// by definition.
fn resolve_inbound_refs(
    registry: &Registry,
    mut body: serde_json::Value,
) -> Result<serde_json::Value, RegistryError> {
    if let Some(map) = body.as_object_mut() {
        for (field, value) in map.iter_mut() {
            if field == "target_uri" {
                continue;
            }
            if let Some(uri) = value.as_str().filter(|s| s.starts_with('/')) {
                let entity = registry.resolve(uri)?;
                *value = serde_json::Value::String(entity.id_str().to_string());
            }
        }
    }
    Ok(body)
}

fn parse_payload<T: serde::de::DeserializeOwned>(
    body: serde_json::Value,
) -> Result<T, RegistryError> {
    serde_json::from_value(body).map_err(|e| RegistryError::Validation(e.to_string()))
}

// =============================================================================
// RESPONSE HELPERS
// =============================================================================

/// 201 with the entity and its canonical URI.
fn created(registry: &Registry, entity: &Resolved) -> Response {
    let uri = match registry.canonical_uri(entity) {
        Ok(uri) => uri,
        Err(e) => return err(&e),
    };
    let mut value = match serde_json::to_value(entity) {
        Ok(v) => v,
        Err(e) => return err(&RegistryError::SerializationError(e.to_string())),
    };
    super::types::strip_nulls(&mut value);
    (
        StatusCode::CREATED,
        Json(CreatedResponse { uri, entity: value }),
    )
        .into_response()
}

/// 201 with the owner's canonical URI plus the import report.
fn imported(registry: &Registry, owner: &Resolved, report: ImportReport) -> Response {
    let uri = match registry.canonical_uri(owner) {
        Ok(uri) => uri,
        Err(e) => return err(&e),
    };
    (StatusCode::CREATED, Json(ImportResponse { uri, report })).into_response()
}
