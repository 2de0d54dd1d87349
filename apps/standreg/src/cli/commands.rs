//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use standreg_core::{
    CollectionImport, DocumentImport, ImportOptions, ImportReport, NewJurisdiction, Registry,
    RegistryError, Resolved, VocabularyImport,
};
use std::path::PathBuf;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for imports (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_IMPORT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &PathBuf, max_size: u64) -> Result<(), RegistryError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| RegistryError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(RegistryError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate file path for security.
///
/// This function:
/// 1. Canonicalizes the path to resolve symlinks and ".."
/// 2. Ensures the path exists
/// 3. Ensures the path is a file (not a directory)
fn validate_file_path(path: &std::path::Path) -> Result<PathBuf, RegistryError> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path.canonicalize().map_err(|e| {
        RegistryError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    // Ensure it's a file, not a directory
    if !canonical.is_file() {
        return Err(RegistryError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read and deserialize a JSON import file with path and size checks.
fn read_import_file<T: serde::de::DeserializeOwned>(file: &PathBuf) -> Result<T, RegistryError> {
    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| RegistryError::IoError(format!("Read file: {}", e)))?;
    serde_json::from_slice(&contents).map_err(|e| {
        RegistryError::SerializationError(format!("Parse '{}': {}", file.display(), e))
    })
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    db_path: &PathBuf,
    backend: &str,
    host: &str,
    port: u16,
) -> Result<(), RegistryError> {
    let registry = load_or_create_registry(db_path, backend)?;

    println!("Standreg Registry Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Endpoints:");
    println!("  GET    /health                      - Health check");
    println!("  GET    /status                      - Registry row counts");
    println!("  GET    /                            - List jurisdictions");
    println!("  POST   /jurisdictions               - Create a jurisdiction");
    println!("  POST   /{{juri}}/terms                - Import a vocabulary");
    println!("  POST   /{{juri}}/documents            - Import a standards document");
    println!("  POST   /{{juri}}/contentcollections   - Import a content collection");
    println!("  GET    /{{juri}}/...                  - Resolve any canonical URI");
    println!("  DELETE /{{juri}}/...                  - Delete by canonical URI");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, registry).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show registry row counts.
pub fn cmd_status(db_path: &PathBuf, backend: &str, json_mode: bool) -> Result<(), RegistryError> {
    let registry = load_or_create_registry(db_path, backend)?;
    let counts = registry.counts()?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": backend,
            "jurisdictions": counts.jurisdictions,
            "vocabularies": counts.vocabularies,
            "terms": counts.terms,
            "term_relations": counts.term_relations,
            "documents": counts.documents,
            "standard_nodes": counts.standard_nodes,
            "crosswalks": counts.crosswalks,
            "standard_node_relations": counts.standard_node_relations,
            "collections": counts.collections,
            "content_nodes": counts.content_nodes,
            "correlations": counts.correlations,
            "content_standard_relations": counts.content_standard_relations,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Standreg Registry Status");
    println!("========================");
    println!("Database: {:?}", db_path);
    println!("Backend:  {}", backend);
    println!();
    println!("Jurisdictions:          {}", counts.jurisdictions);
    println!("Vocabularies:           {}", counts.vocabularies);
    println!("Terms:                  {}", counts.terms);
    println!("Term Relations:         {}", counts.term_relations);
    println!("Documents:              {}", counts.documents);
    println!("Standard Nodes:         {}", counts.standard_nodes);
    println!("Crosswalks:             {}", counts.crosswalks);
    println!("Crosswalk Edges:        {}", counts.standard_node_relations);
    println!("Collections:            {}", counts.collections);
    println!("Content Nodes:          {}", counts.content_nodes);
    println!("Correlations:           {}", counts.correlations);
    println!("Correlation Edges:      {}", counts.content_standard_relations);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(db_path: &PathBuf, backend: &str, force: bool) -> Result<(), RegistryError> {
    if backend == "memory" {
        return Err(RegistryError::Validation(
            "The memory backend has nothing to initialize".to_string(),
        ));
    }

    if db_path.exists() && !force {
        return Err(RegistryError::Conflict(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    if db_path.exists() {
        std::fs::remove_file(db_path)
            .map_err(|e| RegistryError::IoError(format!("Remove old database: {}", e)))?;
    }

    let _registry = Registry::open(db_path)?;
    println!("Initialized new redb database at {:?}", db_path);

    Ok(())
}

// =============================================================================
// CREATE-JURISDICTION COMMAND
// =============================================================================

/// Create a jurisdiction.
#[allow(clippy::too_many_arguments)]
pub fn cmd_create_jurisdiction(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    name: String,
    display_name: String,
    country: Option<String>,
    language: Option<String>,
    website_url: Option<String>,
) -> Result<(), RegistryError> {
    let mut registry = load_or_create_registry(db_path, backend)?;

    let juri = registry.create_jurisdiction(NewJurisdiction {
        name,
        display_name,
        country,
        language,
        website_url,
        ..NewJurisdiction::default()
    })?;

    if json_mode {
        let mut value = serde_json::to_value(&juri)
            .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
        api::strip_nulls(&mut value);
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_default()
        );
    } else {
        println!("Created jurisdiction {} at {}", juri.display_name, juri.uri());
    }

    Ok(())
}

// =============================================================================
// IMPORT COMMANDS
// =============================================================================

/// Import a vocabulary with its terms from a JSON file.
pub fn cmd_load_terms(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    jurisdiction: &str,
    file: &PathBuf,
    require_parent_rows: bool,
) -> Result<(), RegistryError> {
    tracing::info!("Loading vocabulary from {:?}", file);

    let mut registry = load_or_create_registry(db_path, backend)?;
    let import: VocabularyImport = read_import_file(file)?;
    let options = ImportOptions {
        require_parent_rows,
    };

    let (vocab, report) = registry.import_vocabulary(jurisdiction, import, &options)?;
    let uri = registry.canonical_uri(&Resolved::Vocabulary(vocab))?;
    print_report(json_mode, &uri, &report);

    Ok(())
}

/// Import a standards document tree from a JSON file.
pub fn cmd_import_document(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    jurisdiction: &str,
    file: &PathBuf,
) -> Result<(), RegistryError> {
    tracing::info!("Importing document from {:?}", file);

    let mut registry = load_or_create_registry(db_path, backend)?;
    let import: DocumentImport = read_import_file(file)?;

    let (doc, report) = registry.import_document(jurisdiction, import)?;
    let uri = registry.canonical_uri(&Resolved::Document(doc))?;
    print_report(json_mode, &uri, &report);

    Ok(())
}

/// Import a content collection tree from a JSON file.
pub fn cmd_import_collection(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    jurisdiction: &str,
    file: &PathBuf,
) -> Result<(), RegistryError> {
    tracing::info!("Importing collection from {:?}", file);

    let mut registry = load_or_create_registry(db_path, backend)?;
    let import: CollectionImport = read_import_file(file)?;

    let (coll, report) = registry.import_collection(jurisdiction, import)?;
    let uri = registry.canonical_uri(&Resolved::Collection(coll))?;
    print_report(json_mode, &uri, &report);

    Ok(())
}

fn print_report(json_mode: bool, uri: &str, report: &ImportReport) {
    if json_mode {
        let output = serde_json::json!({ "uri": uri, "report": report });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return;
    }

    println!("Imported {}", uri);
    if report.vocabularies_created > 0 {
        println!("  Vocabularies: {}", report.vocabularies_created);
    }
    if report.terms_created > 0 {
        println!("  Terms:        {}", report.terms_created);
    }
    if report.documents_created > 0 {
        println!("  Documents:    {}", report.documents_created);
    }
    if report.nodes_created > 0 {
        println!("  Nodes:        {}", report.nodes_created);
    }
    if report.collections_created > 0 {
        println!("  Collections:  {}", report.collections_created);
    }
    for warning in &report.warnings {
        println!("  Warning: {}", warning);
    }
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

/// Resolve a canonical URI and print the entity.
pub fn cmd_resolve(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    uri: &str,
) -> Result<(), RegistryError> {
    let registry = load_or_create_registry(db_path, backend)?;

    let entity = registry.resolve(uri)?;
    let canonical = registry.canonical_uri(&entity)?;
    let links = registry.links(&entity)?;

    if json_mode {
        let mut value = serde_json::to_value(&entity)
            .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
        api::strip_nulls(&mut value);
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "uri".to_string(),
                serde_json::Value::String(canonical.clone()),
            );
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
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_default()
        );
        return Ok(());
    }

    println!("{}", canonical);
    let mut value = serde_json::to_value(&entity)
        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;
    api::strip_nulls(&mut value);
    if let Some(map) = value.as_object() {
        for (field, val) in map {
            println!("  {}: {}", field, val);
        }
    }
    if !links.is_empty() {
        println!("Links:");
        for link in &links {
            println!("  {} -> {}", link.field, link.uri);
        }
    }

    Ok(())
}

// =============================================================================
// DELETE COMMAND
// =============================================================================

/// Delete the entity at a canonical URI.
pub fn cmd_delete(db_path: &PathBuf, backend: &str, uri: &str) -> Result<(), RegistryError> {
    let mut registry = load_or_create_registry(db_path, backend)?;
    registry.delete(uri)?;
    println!("Deleted {}", uri);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load or create a registry from a database path with specified backend.
///
/// The memory backend is volatile: useful for the server and for smoke
/// tests, useless for anything that should outlive the process.
pub fn load_or_create_registry(db_path: &PathBuf, backend: &str) -> Result<Registry, RegistryError> {
    match backend {
        "memory" => Ok(Registry::in_memory()),
        "redb" => Registry::open(db_path),
        other => Err(RegistryError::Validation(format!(
            "Unknown backend: {}. Use: redb, memory",
            other
        ))),
    }
}
