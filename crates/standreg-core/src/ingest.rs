//! # Importers
//!
//! Bulk loading of vocabularies, standards documents, and content
//! collections from structured records (typically deserialized from JSON
//! fixture files).
//!
//! Imports are batch-shaped: records carry natural keys and nesting, ids
//! are minted here, and tree placement goes through the tree guard so all
//! structural invariants hold for imported data too. Vocabulary and term
//! lookups made while resolving `kind` references are memoized in a
//! [`VocabularyLookup`] that lives for one import run only; there is no
//! process-wide cache to go stale.

use crate::model::{
    ContentCollection, ContentNode, ControlledVocabulary, Jurisdiction, StandardNode,
    StandardsDocument, Term, VocabularyKind,
};
use crate::path;
use crate::store::RegistryStore;
use crate::tree::{self, Placement};
use crate::types::{
    CollectionId, ContentNodeId, DocumentId, JurisdictionId, RegistryError, StandardNodeId,
    TermId, VocabularyId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// OPTIONS AND REPORTS
// =============================================================================

/// Knobs for an import run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// When set, every non-root term path must have an existing parent row
    /// (in the store or earlier in the same batch). When unset, sparse
    /// taxonomies with implicit intermediate levels are accepted.
    pub require_parent_rows: bool,
}

/// What an import run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub vocabularies_created: usize,
    pub terms_created: usize,
    pub documents_created: usize,
    pub nodes_created: usize,
    pub collections_created: usize,
    /// Non-fatal findings, e.g. a `kind` reference that did not resolve.
    pub warnings: Vec<String>,
}

// =============================================================================
// IMPORT RECORDS
// =============================================================================

/// One term row in a vocabulary import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TermRecord {
    pub path: String,
    pub label: String,
    pub alt_label: Option<String>,
    pub notation: Option<String>,
    pub definition: Option<String>,
    pub notes: Option<String>,
    pub language: Option<String>,
    pub source_uri: Option<String>,
    pub canonical_uri: Option<String>,
    /// Explicit sibling position; record order is used when absent.
    pub sort_order: Option<f64>,
}

/// A vocabulary plus its terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyImport {
    pub name: String,
    pub label: String,
    pub kind: Option<VocabularyKind>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub creator: Option<String>,
    pub terms: Vec<TermRecord>,
}

/// One node in a standards document tree, nested recursively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeRecord {
    pub notation: Option<String>,
    pub list_id: Option<String>,
    pub title: Option<String>,
    pub description: String,
    /// Term path into the document's element vocabulary.
    pub kind: Option<String>,
    pub language: Option<String>,
    pub children: Vec<NodeRecord>,
}

/// A standards document plus its node tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentImport {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
    pub source_doc: Option<String>,
    /// Vocabulary that node `kind` paths resolve against.
    pub element_vocabulary: Option<String>,
    pub root: NodeRecord,
}

/// One node in a content collection tree, nested recursively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentNodeRecord {
    pub title: String,
    pub description: Option<String>,
    pub content_kind: Option<String>,
    pub source_id: Option<String>,
    pub source_url: Option<String>,
    pub language: Option<String>,
    pub children: Vec<ContentNodeRecord>,
}

/// A content collection plus its node tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionImport {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub source_domain: Option<String>,
    pub source_url: Option<String>,
    pub collection_id: Option<String>,
    pub version: Option<String>,
    pub root: ContentNodeRecord,
}

// =============================================================================
// VOCABULARY LOOKUP
// =============================================================================

/// Memoized vocabulary and term lookups, scoped to one import run.
#[derive(Debug, Default)]
pub struct VocabularyLookup {
    vocabularies: BTreeMap<(String, String), Option<VocabularyId>>,
    terms: BTreeMap<(String, String), Option<TermId>>,
}

impl VocabularyLookup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Vocabulary id for `(jurisdiction, name)`, memoized.
    pub fn vocabulary(
        &mut self,
        store: &dyn RegistryStore,
        jurisdiction: &JurisdictionId,
        name: &str,
    ) -> Result<Option<VocabularyId>, RegistryError> {
        let key = (jurisdiction.0.clone(), name.to_string());
        if let Some(hit) = self.vocabularies.get(&key) {
            return Ok(hit.clone());
        }
        let id = store
            .vocabulary_by_key(jurisdiction, name)?
            .map(|v| v.id);
        self.vocabularies.insert(key, id.clone());
        Ok(id)
    }

    /// Term id for `(vocabulary, path)`, memoized.
    pub fn term(
        &mut self,
        store: &dyn RegistryStore,
        vocabulary: &VocabularyId,
        term_path: &str,
    ) -> Result<Option<TermId>, RegistryError> {
        let key = (vocabulary.0.clone(), term_path.to_string());
        if let Some(hit) = self.terms.get(&key) {
            return Ok(hit.clone());
        }
        let id = store.term_by_path(vocabulary, term_path)?.map(|t| t.id);
        self.terms.insert(key, id.clone());
        Ok(id)
    }
}

// =============================================================================
// JURISDICTIONS
// =============================================================================

/// Fields accepted when creating a jurisdiction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewJurisdiction {
    pub name: String,
    pub display_name: String,
    pub alt_name: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub notes: Option<String>,
    pub website_url: Option<String>,
}

/// Create a jurisdiction with a fresh id. The name must be a valid URI
/// segment since it becomes the tenant's URI prefix.
pub fn create_jurisdiction<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    new: NewJurisdiction,
) -> Result<Jurisdiction, RegistryError> {
    path::validate_segment(&new.name)?;
    let id = loop {
        let id = JurisdictionId::generate(rng);
        if store.jurisdiction(&id)?.is_none() {
            break id;
        }
    };
    let juri = Jurisdiction {
        id,
        name: new.name,
        display_name: new.display_name,
        alt_name: new.alt_name,
        country: new.country,
        language: new.language,
        notes: new.notes,
        website_url: new.website_url,
    };
    store.insert_jurisdiction(juri.clone())?;
    Ok(juri)
}

// =============================================================================
// VOCABULARY IMPORT
// =============================================================================

/// Import a vocabulary and its terms under a jurisdiction.
///
/// Terms are inserted parents-first regardless of record order. With
/// [`ImportOptions::require_parent_rows`] set, a term whose parent path has
/// no row fails the run.
pub fn import_vocabulary<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    jurisdiction: &JurisdictionId,
    import: VocabularyImport,
    options: &ImportOptions,
) -> Result<(ControlledVocabulary, ImportReport), RegistryError> {
    path::validate_segment(&import.name)?;
    if store.jurisdiction(jurisdiction)?.is_none() {
        return Err(RegistryError::NotFound(jurisdiction.0.clone()));
    }
    let vocab_id = loop {
        let id = VocabularyId::generate(rng);
        if store.vocabulary(&id)?.is_none() {
            break id;
        }
    };
    let vocab = ControlledVocabulary {
        id: vocab_id,
        jurisdiction: jurisdiction.clone(),
        kind: import.kind,
        name: import.name,
        label: import.label,
        description: import.description,
        language: import.language,
        source: import.source,
        notes: import.notes,
        creator: import.creator,
    };
    store.insert_vocabulary(vocab.clone())?;

    let mut report = ImportReport {
        vocabularies_created: 1,
        ..ImportReport::default()
    };
    // A failed run leaves nothing behind: insert_terms unwinds its own
    // rows, the vocabulary row is removed here, and a retry under the same
    // name starts clean.
    if let Err(e) = insert_terms(store, rng, &vocab.id, import.terms, options, &mut report) {
        store.delete_vocabulary(&vocab.id)?;
        return Err(e);
    }
    Ok((vocab, report))
}

/// Append terms to a vocabulary that already exists.
///
/// Follows the same ordering and parent rules as a full vocabulary import,
/// with existing rows counting as parents.
pub fn add_terms<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    jurisdiction: &JurisdictionId,
    vocabulary_name: &str,
    terms: Vec<TermRecord>,
    options: &ImportOptions,
) -> Result<(ControlledVocabulary, ImportReport), RegistryError> {
    let Some(vocab) = store.vocabulary_by_key(jurisdiction, vocabulary_name)? else {
        return Err(RegistryError::NotFound(vocabulary_name.to_string()));
    };
    let mut report = ImportReport::default();
    insert_terms(store, rng, &vocab.id, terms, options, &mut report)?;
    Ok((vocab, report))
}

/// Insert term records parents-first, validating every path. Any failure
/// unwinds the rows inserted earlier in the same run before returning.
fn insert_terms<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    vocabulary: &VocabularyId,
    terms: Vec<TermRecord>,
    options: &ImportOptions,
    report: &mut ImportReport,
) -> Result<(), RegistryError> {
    let mut records: Vec<(usize, TermRecord)> = terms.into_iter().enumerate().collect();
    records.sort_by_key(|(i, r)| (path::depth(&r.path), *i));
    let mut inserted: Vec<TermId> = Vec::new();
    for (index, record) in records {
        match insert_term_record(store, rng, vocabulary, index, record, options) {
            Ok(id) => {
                inserted.push(id);
                report.terms_created += 1;
            }
            Err(e) => {
                for id in &inserted {
                    store.delete_term(id)?;
                }
                report.terms_created = 0;
                return Err(e);
            }
        }
    }
    Ok(())
}

fn insert_term_record<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    vocabulary: &VocabularyId,
    index: usize,
    record: TermRecord,
    options: &ImportOptions,
) -> Result<TermId, RegistryError> {
    path::validate(&record.path)?;
    if options.require_parent_rows
        && let Some(parent) = path::parent_path(&record.path)
        && store.term_by_path(vocabulary, parent)?.is_none()
    {
        return Err(RegistryError::Validation(format!(
            "term {:?} has no parent row {parent:?}",
            record.path
        )));
    }
    let term_id = loop {
        let id = TermId::generate(rng);
        if store.term(&id)?.is_none() {
            break id;
        }
    };
    store.insert_term(Term {
        id: term_id.clone(),
        vocabulary: vocabulary.clone(),
        path: record.path,
        label: record.label,
        alt_label: record.alt_label,
        notation: record.notation,
        definition: record.definition,
        notes: record.notes,
        language: record.language,
        source_uri: record.source_uri,
        canonical_uri: record.canonical_uri,
        sort_order: record.sort_order.unwrap_or((index + 1) as f64),
    })?;
    Ok(term_id)
}

// =============================================================================
// DOCUMENT IMPORT
// =============================================================================

/// Import a standards document and its node tree under a jurisdiction.
///
/// Node `kind` paths resolve against `element_vocabulary` through a per-run
/// [`VocabularyLookup`]; unresolved kinds become warnings, not errors.
pub fn import_document<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    jurisdiction: &JurisdictionId,
    import: DocumentImport,
) -> Result<(StandardsDocument, ImportReport), RegistryError> {
    path::validate_segment(&import.name)?;
    if store.jurisdiction(jurisdiction)?.is_none() {
        return Err(RegistryError::NotFound(jurisdiction.0.clone()));
    }
    let doc_id = loop {
        let id = DocumentId::generate(rng);
        if store.document(&id)?.is_none() {
            break id;
        }
    };
    let doc = StandardsDocument {
        id: doc_id,
        name: import.name,
        jurisdiction: jurisdiction.clone(),
        title: import.title,
        description: import.description,
        language: import.language,
        publisher: import.publisher,
        version: import.version,
        source_doc: import.source_doc,
        ..StandardsDocument::default()
    };
    store.insert_document(doc.clone())?;

    let mut report = ImportReport {
        documents_created: 1,
        ..ImportReport::default()
    };
    let mut lookup = VocabularyLookup::new();
    let element_vocab = match &import.element_vocabulary {
        Some(name) => lookup.vocabulary(store, jurisdiction, name)?,
        None => None,
    };
    if import.element_vocabulary.is_some() && element_vocab.is_none() {
        report.warnings.push(format!(
            "element vocabulary {:?} not found; node kinds left unset",
            import.element_vocabulary.unwrap_or_default()
        ));
    }

    let root_node = new_standard_node(store, rng, &doc.id, &import.root, &element_vocab, &mut lookup, &mut report)?;
    let root = tree::insert_standard_root(store, root_node)?;
    report.nodes_created += 1;
    import_standard_children(
        store,
        rng,
        &doc.id,
        &root.id,
        &import.root.children,
        &element_vocab,
        &mut lookup,
        &mut report,
    )?;
    Ok((doc, report))
}

fn new_standard_node<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    document: &DocumentId,
    record: &NodeRecord,
    element_vocab: &Option<VocabularyId>,
    lookup: &mut VocabularyLookup,
    report: &mut ImportReport,
) -> Result<StandardNode, RegistryError> {
    let kind = match (&record.kind, element_vocab) {
        (Some(kind_path), Some(vocab)) => {
            let hit = lookup.term(store, vocab, kind_path)?;
            if hit.is_none() {
                report
                    .warnings
                    .push(format!("node kind {kind_path:?} not found"));
            }
            hit
        }
        _ => None,
    };
    let id = loop {
        let id = StandardNodeId::generate(rng);
        if store.standard_node(&id)?.is_none() {
            break id;
        }
    };
    Ok(StandardNode {
        id,
        document: document.clone(),
        kind,
        notation: record.notation.clone(),
        list_id: record.list_id.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        language: record.language.clone(),
        ..StandardNode::default()
    })
}

fn import_standard_children<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    document: &DocumentId,
    parent: &StandardNodeId,
    records: &[NodeRecord],
    element_vocab: &Option<VocabularyId>,
    lookup: &mut VocabularyLookup,
    report: &mut ImportReport,
) -> Result<(), RegistryError> {
    for record in records {
        let node = new_standard_node(store, rng, document, record, element_vocab, lookup, report)?;
        let node = tree::attach_standard_child(store, node, parent, Placement::Last)?;
        report.nodes_created += 1;
        import_standard_children(
            store,
            rng,
            document,
            &node.id,
            &record.children,
            element_vocab,
            lookup,
            report,
        )?;
    }
    Ok(())
}

// =============================================================================
// COLLECTION IMPORT
// =============================================================================

/// Import a content collection and its node tree under a jurisdiction.
pub fn import_collection<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    jurisdiction: &JurisdictionId,
    import: CollectionImport,
) -> Result<(ContentCollection, ImportReport), RegistryError> {
    if store.jurisdiction(jurisdiction)?.is_none() {
        return Err(RegistryError::NotFound(jurisdiction.0.clone()));
    }
    let coll_id = loop {
        let id = CollectionId::generate(rng);
        if store.collection(&id)?.is_none() {
            break id;
        }
    };
    let coll = ContentCollection {
        id: coll_id,
        jurisdiction: jurisdiction.clone(),
        name: import.name,
        description: import.description,
        language: import.language,
        country: import.country,
        source_domain: import.source_domain,
        source_url: import.source_url,
        collection_id: import.collection_id,
        version: import.version,
        ..ContentCollection::default()
    };
    store.insert_collection(coll.clone())?;

    let mut report = ImportReport {
        collections_created: 1,
        ..ImportReport::default()
    };
    let root_node = new_content_node(store, rng, &coll.id, &import.root)?;
    let root = tree::insert_content_root(store, root_node)?;
    report.nodes_created += 1;
    import_content_children(store, rng, &coll.id, &root.id, &import.root.children, &mut report)?;
    Ok((coll, report))
}

fn new_content_node<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    collection: &CollectionId,
    record: &ContentNodeRecord,
) -> Result<ContentNode, RegistryError> {
    let id = loop {
        let id = ContentNodeId::generate(rng);
        if store.content_node(&id)?.is_none() {
            break id;
        }
    };
    Ok(ContentNode {
        id,
        collection: collection.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        content_kind: record.content_kind.clone(),
        source_id: record.source_id.clone(),
        source_url: record.source_url.clone(),
        language: record.language.clone(),
        ..ContentNode::default()
    })
}

fn import_content_children<R: Rng>(
    store: &mut dyn RegistryStore,
    rng: &mut R,
    collection: &CollectionId,
    parent: &ContentNodeId,
    records: &[ContentNodeRecord],
    report: &mut ImportReport,
) -> Result<(), RegistryError> {
    for record in records {
        let node = new_content_node(store, rng, collection, record)?;
        let node = tree::attach_content_child(store, node, parent, Placement::Last)?;
        report.nodes_created += 1;
        import_content_children(store, rng, collection, &node.id, &record.children, report)?;
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn ghana(store: &mut MemStore) -> Jurisdiction {
        let mut rng = rand::rng();
        create_jurisdiction(
            store,
            &mut rng,
            NewJurisdiction {
                name: "Ghana".to_string(),
                display_name: "Ghana NaCCA".to_string(),
                ..NewJurisdiction::default()
            },
        )
        .expect("jurisdiction")
    }

    fn grade_levels() -> VocabularyImport {
        VocabularyImport {
            name: "GradeLevels".to_string(),
            label: "Grade Levels".to_string(),
            kind: Some(VocabularyKind::EducationLevels),
            terms: vec![
                TermRecord {
                    path: "B2".to_string(),
                    label: "Basic 2".to_string(),
                    ..TermRecord::default()
                },
                TermRecord {
                    path: "B2/2".to_string(),
                    label: "Basic 2, Term 2".to_string(),
                    ..TermRecord::default()
                },
            ],
            ..VocabularyImport::default()
        }
    }

    #[test]
    fn vocabulary_import_loads_terms_parents_first() {
        let mut store = MemStore::new();
        let juri = ghana(&mut store);
        let mut rng = rand::rng();
        // Deliberately deep-first record order; the importer reorders.
        let mut import = grade_levels();
        import.terms.reverse();
        let (vocab, report) = import_vocabulary(
            &mut store,
            &mut rng,
            &juri.id,
            import,
            &ImportOptions {
                require_parent_rows: true,
            },
        )
        .expect("import");
        assert_eq!(report.terms_created, 2);
        assert!(
            store
                .term_by_path(&vocab.id, "B2/2")
                .expect("read")
                .is_some()
        );
    }

    #[test]
    fn add_terms_extends_an_existing_vocabulary() {
        let mut store = MemStore::new();
        let juri = ghana(&mut store);
        let mut rng = rand::rng();
        let (vocab, _) = import_vocabulary(
            &mut store,
            &mut rng,
            &juri.id,
            grade_levels(),
            &ImportOptions::default(),
        )
        .expect("import");

        // Existing rows count as parents even under strict checking.
        let (appended, report) = add_terms(
            &mut store,
            &mut rng,
            &juri.id,
            "GradeLevels",
            vec![TermRecord {
                path: "B2/3".to_string(),
                label: "Basic 2, Term 3".to_string(),
                ..TermRecord::default()
            }],
            &ImportOptions {
                require_parent_rows: true,
            },
        )
        .expect("append");
        assert_eq!(appended.id, vocab.id);
        assert_eq!(report.vocabularies_created, 0);
        assert_eq!(report.terms_created, 1);
        assert!(
            store
                .term_by_path(&vocab.id, "B2/3")
                .expect("read")
                .is_some()
        );

        let missing = add_terms(
            &mut store,
            &mut rng,
            &juri.id,
            "NoSuchVocabulary",
            Vec::new(),
            &ImportOptions::default(),
        );
        assert!(matches!(missing, Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn missing_parent_row_fails_only_when_required() {
        let mut store = MemStore::new();
        let juri = ghana(&mut store);
        let mut rng = rand::rng();
        // The first record is fine; the orphan fails the strict run after
        // one term has already been written.
        let orphan_only = VocabularyImport {
            name: "Sparse".to_string(),
            label: "Sparse".to_string(),
            terms: vec![
                TermRecord {
                    path: "A".to_string(),
                    label: "Root".to_string(),
                    ..TermRecord::default()
                },
                TermRecord {
                    path: "X/Y".to_string(),
                    label: "Leaf".to_string(),
                    ..TermRecord::default()
                },
            ],
            ..VocabularyImport::default()
        };
        let err = import_vocabulary(
            &mut store,
            &mut rng,
            &juri.id,
            orphan_only.clone(),
            &ImportOptions {
                require_parent_rows: true,
            },
        );
        assert!(matches!(err, Err(RegistryError::Validation(_))));
        // The failed run leaves no vocabulary row behind, so retrying under
        // the same name succeeds.
        assert!(
            store
                .vocabulary_by_key(&juri.id, "Sparse")
                .expect("read")
                .is_none()
        );
        assert_eq!(store.counts().expect("counts").terms, 0);

        let (_, report) = import_vocabulary(
            &mut store,
            &mut rng,
            &juri.id,
            orphan_only,
            &ImportOptions::default(),
        )
        .expect("sparse import");
        assert_eq!(report.terms_created, 2);
    }

    #[test]
    fn document_import_builds_the_tree_and_resolves_kinds() {
        let mut store = MemStore::new();
        let juri = ghana(&mut store);
        let mut rng = rand::rng();
        let elements = VocabularyImport {
            name: "Elements".to_string(),
            label: "Curriculum Elements".to_string(),
            kind: Some(VocabularyKind::CurriculumElements),
            terms: vec![
                TermRecord {
                    path: "strand".to_string(),
                    label: "Strand".to_string(),
                    ..TermRecord::default()
                },
                TermRecord {
                    path: "indicator".to_string(),
                    label: "Indicator".to_string(),
                    ..TermRecord::default()
                },
            ],
            ..VocabularyImport::default()
        };
        import_vocabulary(&mut store, &mut rng, &juri.id, elements, &ImportOptions::default())
            .expect("elements");

        let import = DocumentImport {
            name: "GhanaMath".to_string(),
            title: "Mathematics Curriculum".to_string(),
            element_vocabulary: Some("Elements".to_string()),
            root: NodeRecord {
                description: "Mathematics".to_string(),
                children: vec![NodeRecord {
                    notation: Some("B2.1".to_string()),
                    description: "Number operations".to_string(),
                    kind: Some("strand".to_string()),
                    children: vec![NodeRecord {
                        notation: Some("B2.1.1".to_string()),
                        description: "Count to 1000".to_string(),
                        kind: Some("missing_kind".to_string()),
                        ..NodeRecord::default()
                    }],
                    ..NodeRecord::default()
                }],
                ..NodeRecord::default()
            },
            ..DocumentImport::default()
        };
        let (doc, report) =
            import_document(&mut store, &mut rng, &juri.id, import).expect("import");
        assert_eq!(report.nodes_created, 3);
        assert_eq!(report.warnings.len(), 1);

        let root = store
            .document_root(&doc.id)
            .expect("read")
            .expect("root present");
        let children = store.standard_children(&root.id).expect("children");
        assert_eq!(children.len(), 1);
        assert!(children[0].kind.is_some());
        let grandchildren = store.standard_children(&children[0].id).expect("children");
        assert_eq!(grandchildren[0].depth, 2);
        assert!(grandchildren[0].kind.is_none());
    }

    #[test]
    fn collection_import_builds_the_tree() {
        let mut store = MemStore::new();
        let juri = ghana(&mut store);
        let mut rng = rand::rng();
        let import = CollectionImport {
            name: "KhanAcademy".to_string(),
            source_domain: Some("khanacademy.org".to_string()),
            root: ContentNodeRecord {
                title: "Khan Academy".to_string(),
                children: vec![ContentNodeRecord {
                    title: "Arithmetic".to_string(),
                    content_kind: Some("topic".to_string()),
                    children: vec![ContentNodeRecord {
                        title: "Counting videos".to_string(),
                        content_kind: Some("video".to_string()),
                        ..ContentNodeRecord::default()
                    }],
                    ..ContentNodeRecord::default()
                }],
                ..ContentNodeRecord::default()
            },
            ..CollectionImport::default()
        };
        let (coll, report) =
            import_collection(&mut store, &mut rng, &juri.id, import).expect("import");
        assert_eq!(report.nodes_created, 3);
        let root = store
            .collection_root(&coll.id)
            .expect("read")
            .expect("root present");
        assert_eq!(root.depth, 0);
    }
}
