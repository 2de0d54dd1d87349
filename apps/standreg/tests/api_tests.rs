//! Integration tests for the standreg HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum_test::TestServer;
use serde_json::json;
use standreg::api::{AppState, HealthResponse, StatusResponse, create_router};
use standreg_core::Registry;
use std::sync::Mutex;

/// Mutex to serialize tests since some modify env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("STANDREG_API_KEY") };
    }
}

/// Create a test server with a fresh in-memory registry.
/// Returns a guard that must be kept alive during the test.
fn create_test_server() -> (TestServer, TestGuard) {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var("STANDREG_API_KEY") };
    let registry = Registry::in_memory();
    let state = AppState::new(registry);
    let router = create_router(state);
    (
        TestServer::new(router).unwrap(),
        TestGuard { _guard: guard },
    )
}

/// Create the Ghana tenant with a GradeLevels vocabulary over the API.
async fn seed_ghana(server: &TestServer) {
    let response = server
        .post("/jurisdictions")
        .json(&json!({
            "name": "Ghana",
            "display_name": "Ghana NaCCA",
            "country": "GH",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/Ghana/terms")
        .json(&json!({
            "name": "GradeLevels",
            "label": "Grade Levels",
            "terms": [
                { "path": "B2", "label": "Basic 2" },
                { "path": "B2/2", "label": "Basic 2, Term 2" },
            ],
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
}

/// Import a one-child document for a tenant, returning its canonical URI.
async fn seed_document(server: &TestServer, jurisdiction: &str, name: &str) -> String {
    let response = server
        .post(&format!("/{}/documents", jurisdiction))
        .json(&json!({
            "name": name,
            "title": "Mathematics",
            "root": {
                "description": "Mathematics",
                "children": [
                    { "notation": "B2.1", "description": "Number operations" },
                ],
            },
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["uri"].as_str().unwrap().to_string()
}

/// The id tail of a canonical entity URI like `/Ghana/documents/DabcdEFGH`.
fn id_from_uri(uri: &str) -> String {
    uri.rsplit('/').next().unwrap().to_string()
}

// =============================================================================
// HEALTH AND STATUS TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_empty_registry() {
    let (server, _guard) = create_test_server();

    let response = server.get("/status").await;

    response.assert_status_ok();
    let status: StatusResponse = response.json();
    assert!(!status.persistent);
    assert_eq!(status.jurisdictions, 0);
    assert_eq!(status.terms, 0);
}

#[tokio::test]
async fn test_status_counts_after_seed() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server.get("/status").await;
    let status: StatusResponse = response.json();

    assert_eq!(status.jurisdictions, 1);
    assert_eq!(status.vocabularies, 1);
    assert_eq!(status.terms, 2);
}

// =============================================================================
// JURISDICTION TESTS
// =============================================================================

#[tokio::test]
async fn test_create_jurisdiction_returns_canonical_uri() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/jurisdictions")
        .json(&json!({ "name": "Ghana", "display_name": "Ghana NaCCA" }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["uri"], "/Ghana");
    assert_eq!(body["entity"]["display_name"], "Ghana NaCCA");
}

#[tokio::test]
async fn test_duplicate_jurisdiction_name_conflicts() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server
        .post("/jurisdictions")
        .json(&json!({ "name": "Ghana", "display_name": "Another Ghana" }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_jurisdiction_name_must_be_uri_safe() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/jurisdictions")
        .json(&json!({ "name": "New Zealand", "display_name": "NZQA" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_root_lists_jurisdictions() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server.get("/").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["jurisdictions"][0]["name"], "Ghana");
    assert_eq!(body["jurisdictions"][0]["uri"], "/Ghana");
}

// =============================================================================
// RESOLUTION TESTS
// =============================================================================

#[tokio::test]
async fn test_deep_term_path_resolves() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server.get("/Ghana/terms/GradeLevels/B2/2").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["label"], "Basic 2, Term 2");
    assert_eq!(body["uri"], "/Ghana/terms/GradeLevels/B2/2");
    assert_eq!(body["links"]["parent"], "/Ghana/terms/GradeLevels/B2");
    assert_eq!(body["links"]["vocabulary"], "/Ghana/terms/GradeLevels");
}

#[tokio::test]
async fn test_append_terms_to_existing_vocabulary() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server
        .post("/Ghana/terms/GradeLevels")
        .json(&json!([
            { "path": "B3", "label": "Basic 3" },
        ]))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["uri"], "/Ghana/terms/GradeLevels");
    assert_eq!(body["report"]["terms_created"], 1);
    assert_eq!(body["report"]["vocabularies_created"], 0);

    let resolved = server.get("/Ghana/terms/GradeLevels/B3").await;
    resolved.assert_status_ok();

    // The same path still resolves the vocabulary itself.
    let vocab = server.get("/Ghana/terms/GradeLevels").await;
    vocab.assert_status_ok();
    let vocab_body: serde_json::Value = vocab.json();
    assert_eq!(vocab_body["name"], "GradeLevels");
}

#[tokio::test]
async fn test_append_terms_to_missing_vocabulary_is_not_found() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server
        .post("/Ghana/terms/SubjectAreas")
        .json(&json!([
            { "path": "Mathematics", "label": "Mathematics" },
        ]))
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_format_suffix_selects_representation_not_entity() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let plain = server.get("/Ghana/terms/GradeLevels/B2").await;
    plain.assert_status_ok();
    let plain_body: serde_json::Value = plain.json();

    let suffixed = server.get("/Ghana/terms/GradeLevels/B2.json").await;
    suffixed.assert_status_ok();
    let suffixed_body: serde_json::Value = suffixed.json();
    assert_eq!(plain_body["id"], suffixed_body["id"]);

    let html = server.get("/Ghana/terms/GradeLevels/B2.html").await;
    html.assert_status_ok();
    let page = html.text();
    assert!(page.contains("Basic 2"));
    // Hyperlink fields render as anchors to canonical URIs.
    assert!(page.contains(r#"href="/Ghana/terms/GradeLevels""#));
}

#[tokio::test]
async fn test_accept_header_selects_html_when_no_suffix() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let negotiated = server
        .get("/Ghana/terms/GradeLevels/B2")
        .add_header("accept", "text/html")
        .await;
    negotiated.assert_status_ok();
    assert!(negotiated.text().contains(r#"href="/Ghana/terms/GradeLevels""#));

    // A suffix wins over the header.
    let suffixed = server
        .get("/Ghana/terms/GradeLevels/B2.json")
        .add_header("accept", "text/html")
        .await;
    suffixed.assert_status_ok();
    let body: serde_json::Value = suffixed.json();
    assert_eq!(body["label"], "Basic 2");
}

#[tokio::test]
async fn test_unknown_suffix_is_rejected() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server.get("/Ghana/terms/GradeLevels/B2.xml").await;

    response.assert_status(axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_unknown_term_is_not_found() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server.get("/Ghana/terms/GradeLevels/B9").await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cross_tenant_ids_resolve_as_not_found() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;
    server
        .post("/jurisdictions")
        .json(&json!({ "name": "Kenya", "display_name": "KICD" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let kenya_doc_uri = seed_document(&server, "Kenya", "KenyaMath").await;
    let kenya_doc_id = id_from_uri(&kenya_doc_uri);

    // The id exists, but under Kenya; probing it through Ghana must look
    // exactly like a missing id.
    let response = server
        .get(&format!("/Ghana/documents/{}", kenya_doc_id))
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Not found");
}

// =============================================================================
// DOCUMENT AND NODE TESTS
// =============================================================================

#[tokio::test]
async fn test_document_import_builds_tree() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server
        .post("/Ghana/documents")
        .json(&json!({
            "name": "GhanaMath",
            "title": "Mathematics Standards",
            "root": {
                "description": "Mathematics",
                "children": [
                    { "notation": "B2.1", "description": "Number operations" },
                    { "notation": "B2.2", "description": "Geometry" },
                ],
            },
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["report"]["documents_created"], 1);
    assert_eq!(body["report"]["nodes_created"], 3);
}

#[tokio::test]
async fn test_second_root_node_conflicts() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;
    let doc_uri = seed_document(&server, "Ghana", "GhanaMath").await;
    let doc_id = id_from_uri(&doc_uri);

    // The import already created the root; a parentless node is a second root.
    let response = server
        .post("/Ghana/standardnodes")
        .json(&json!({
            "document": doc_id,
            "description": "another root",
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_child_node_appends_under_parent() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;
    let doc_uri = seed_document(&server, "Ghana", "GhanaMath").await;
    let doc_id = id_from_uri(&doc_uri);

    let root: serde_json::Value = server.get(&doc_uri).await.json();
    let root_link = root["links"]["root"].as_str().unwrap().to_string();
    let root_node: serde_json::Value = server.get(&root_link).await.json();

    let response = server
        .post("/Ghana/standardnodes")
        .json(&json!({
            "document": doc_id,
            "parent": root_node["id"],
            "notation": "B2.9",
            "description": "Data handling",
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["entity"]["depth"], 1);
    assert_eq!(body["entity"]["parent"], root_node["id"]);
}

#[tokio::test]
async fn test_delete_node_takes_subtree() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;
    let doc_uri = seed_document(&server, "Ghana", "GhanaMath").await;

    let root: serde_json::Value = server.get(&doc_uri).await.json();
    let root_link = root["links"]["root"].as_str().unwrap().to_string();

    let before: StatusResponse = server.get("/status").await.json();
    assert_eq!(before.standard_nodes, 2);

    let response = server.delete(&root_link).await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    let after: StatusResponse = server.get("/status").await.json();
    assert_eq!(after.standard_nodes, 0);
    // The document row survives its emptied tree.
    assert_eq!(after.documents, 1);
}

// =============================================================================
// RELATION TESTS
// =============================================================================

#[tokio::test]
async fn test_external_term_relation_serializes_target_uri() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let term: serde_json::Value = server.get("/Ghana/terms/GradeLevels/B2").await.json();

    let response = server
        .post("/Ghana/termrels")
        .json(&json!({
            "source": term["id"],
            "target_uri": "https://example.org/asn/grade2",
            "kind": "exactMatch",
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["entity"]["target_uri"], "https://example.org/asn/grade2");
    // Internal target is absent, not null.
    assert!(body["entity"].get("target").is_none());

    // The stored relation resolves at its own URI, with a source link but
    // no target link (the target lives outside the registry).
    let rel: serde_json::Value = server.get(body["uri"].as_str().unwrap()).await.json();
    assert_eq!(rel["kind"], "exactMatch");
    assert_eq!(rel["links"]["source"], "/Ghana/terms/GradeLevels/B2");
    assert!(rel["links"].get("target").is_none());
}

#[tokio::test]
async fn test_term_relation_needs_internal_or_external_target() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let term: serde_json::Value = server.get("/Ghana/terms/GradeLevels/B2").await.json();

    let response = server
        .post("/Ghana/termrels")
        .json(&json!({ "source": term["id"], "kind": "related" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payload_references_accept_canonical_uris() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    // Endpoints named by URI instead of id resolve before the row is made.
    let response = server
        .post("/Ghana/termrels")
        .json(&json!({
            "source": "/Ghana/terms/GradeLevels/B2/2",
            "target": "/Ghana/terms/GradeLevels/B2",
            "kind": "broader",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();

    let term: serde_json::Value = server.get("/Ghana/terms/GradeLevels/B2/2").await.json();
    assert_eq!(body["entity"]["source"], term["id"]);

    let rel: serde_json::Value = server.get(body["uri"].as_str().unwrap()).await.json();
    assert_eq!(rel["links"]["source"], "/Ghana/terms/GradeLevels/B2/2");
    assert_eq!(rel["links"]["target"], "/Ghana/terms/GradeLevels/B2");
}

#[tokio::test]
async fn test_payload_reference_to_missing_uri_fails() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server
        .post("/Ghana/termrels")
        .json(&json!({
            "source": "/Ghana/terms/GradeLevels/B9",
            "target": "/Ghana/terms/GradeLevels/B2",
            "kind": "broader",
        }))
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_resource_collection_is_not_found() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    let response = server
        .post("/Ghana/widgets")
        .json(&json!({ "title": "nope" }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    // Reads through an unregistered plural are missing resources too, not
    // malformed URIs.
    let response = server.get("/Ghana/widgets/W123").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_below_a_resource_collection_is_not_found() {
    let (server, _guard) = create_test_server();
    seed_ghana(&server).await;

    // Creation endpoints are exactly one plural segment deep.
    let response = server
        .post("/Ghana/standardnodes/S12345678")
        .json(&json!({ "description": "nope" }))
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

// =============================================================================
// AUTH TESTS
// =============================================================================

#[tokio::test]
async fn test_auth_rejects_missing_key() {
    let (server, _guard) = {
        let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::set_var("STANDREG_API_KEY", "sekrit") };
        let state = AppState::new(Registry::in_memory());
        let router = create_router(state);
        (
            TestServer::new(router).unwrap(),
            TestGuard { _guard: guard },
        )
    };

    // Health stays open for load balancers.
    server.get("/health").await.assert_status_ok();

    let response = server.get("/status").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let response = server
        .get("/status")
        .add_header(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_static("Bearer sekrit"),
        )
        .await;
    response.assert_status_ok();
}
