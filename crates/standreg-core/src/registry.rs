//! # Registry Facade
//!
//! [`Registry`] is the single entry point the application layer talks to.
//! It owns a [`StorageBackend`] (in-memory or redb-backed), mints fresh
//! entity ids, and layers validation over the raw store: tenant ownership
//! checks on relation endpoints, tree placement through the tree guard,
//! and URI-driven resolution and deletion.
//!
//! The facade is synchronous. Callers that need shared access wrap it in
//! their own lock; the HTTP layer uses `Arc<RwLock<Registry>>`.

use crate::hyperlink::{Hyperlink, HyperlinkRegistry};
use crate::ingest::{
    self, CollectionImport, DocumentImport, ImportOptions, ImportReport, NewJurisdiction,
    VocabularyImport,
};
use crate::model::{
    ContentCollection, ContentCorrelation, ContentNode, ContentStandardRelation, Jurisdiction,
    StandardNode, StandardNodeRelation, StandardsCrosswalk, StandardsDocument, TermRelation,
    TermRelationKind,
};
use crate::resolve::{self, Resolved};
use crate::storage::RedbStore;
use crate::store::{MemStore, RegistryCounts, RegistryStore};
use crate::tree::{self, Placement};
use crate::types::{
    CollectionId, ContentNodeId, ContentStandardRelationId, CorrelationId, CrosswalkId,
    DocumentId, JurisdictionId, RegistryError, StandardNodeId, StandardNodeRelationId, TermId,
    TermRelationId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Which store a registry runs on.
#[derive(Debug)]
pub enum StorageBackend {
    /// Volatile, for tests and scratch sessions.
    InMemory(MemStore),
    /// Disk-backed via redb.
    Persistent(RedbStore),
}

// =============================================================================
// CREATE PAYLOADS
// =============================================================================

/// Fields accepted when creating a term relation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTermRelation {
    pub source: TermId,
    #[serde(default)]
    pub target: Option<TermId>,
    #[serde(default)]
    pub target_uri: Option<String>,
    pub kind: TermRelationKind,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields accepted when creating a crosswalk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCrosswalk {
    pub title: String,
    pub description: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
}

/// Fields accepted when creating a standard node relation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStandardNodeRelation {
    pub crosswalk: CrosswalkId,
    pub source: StandardNodeId,
    pub target: StandardNodeId,
    #[serde(default)]
    pub kind: Option<TermId>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields accepted when creating a content correlation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCorrelation {
    pub title: String,
    pub description: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
}

/// Fields accepted when creating a content-standard relation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContentStandardRelation {
    pub correlation: CorrelationId,
    pub source: ContentNodeId,
    pub target: StandardNodeId,
    #[serde(default)]
    pub kind: Option<TermId>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields accepted when creating a single standard node. With no `parent`
/// the node becomes the document root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewStandardNode {
    pub document: DocumentId,
    pub parent: Option<StandardNodeId>,
    pub kind: Option<TermId>,
    pub notation: Option<String>,
    pub list_id: Option<String>,
    pub title: Option<String>,
    pub description: String,
    pub language: Option<String>,
    pub notes: Option<String>,
}

/// Fields accepted when creating a single content node. With no `parent`
/// the node becomes the collection root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewContentNode {
    pub collection: CollectionId,
    pub parent: Option<ContentNodeId>,
    pub title: String,
    pub description: Option<String>,
    pub content_kind: Option<String>,
    pub source_id: Option<String>,
    pub source_url: Option<String>,
    pub language: Option<String>,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// The registry: one storage backend plus the validated operations over it.
#[derive(Debug)]
pub struct Registry {
    backend: StorageBackend,
    hyperlinks: HyperlinkRegistry,
    rng: StdRng,
}

impl Registry {
    /// A fresh in-memory registry.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: StorageBackend::InMemory(MemStore::new()),
            hyperlinks: HyperlinkRegistry::standard(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Open (or create) a persistent registry at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
            hyperlinks: HyperlinkRegistry::standard(),
            rng: StdRng::from_os_rng(),
        })
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// The raw store (read access).
    #[must_use]
    pub fn store(&self) -> &dyn RegistryStore {
        match &self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    /// The raw store (write access).
    pub fn store_mut(&mut self) -> &mut dyn RegistryStore {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    fn parts(&mut self) -> (&mut dyn RegistryStore, &mut StdRng) {
        let store: &mut dyn RegistryStore = match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        };
        (store, &mut self.rng)
    }

    // -- reads ----------------------------------------------------------------

    /// Resolve a canonical URI to its entity.
    pub fn resolve(&self, uri: &str) -> Result<Resolved, RegistryError> {
        resolve::resolve_uri(self.store(), uri)
    }

    /// The canonical URI of a resolved entity.
    pub fn canonical_uri(&self, entity: &Resolved) -> Result<String, RegistryError> {
        resolve::uri_of(self.store(), entity)
    }

    /// The hyperlink fields of a resolved entity.
    pub fn links(&self, entity: &Resolved) -> Result<Vec<Hyperlink>, RegistryError> {
        self.hyperlinks.links(self.store(), entity)
    }

    /// Hook for registering additional hyperlink fields.
    pub fn hyperlinks_mut(&mut self) -> &mut HyperlinkRegistry {
        &mut self.hyperlinks
    }

    pub fn counts(&self) -> Result<RegistryCounts, RegistryError> {
        self.store().counts()
    }

    pub fn list_jurisdictions(&self) -> Result<Vec<Jurisdiction>, RegistryError> {
        self.store().list_jurisdictions()
    }

    fn jurisdiction_named(&self, name: &str) -> Result<Jurisdiction, RegistryError> {
        self.store()
            .jurisdiction_by_name(name)?
            .ok_or_else(|| RegistryError::NotFound(format!("jurisdiction {name:?}")))
    }

    // -- creation and import --------------------------------------------------

    pub fn create_jurisdiction(
        &mut self,
        new: NewJurisdiction,
    ) -> Result<Jurisdiction, RegistryError> {
        let (store, rng) = self.parts();
        ingest::create_jurisdiction(store, rng, new)
    }

    pub fn import_vocabulary(
        &mut self,
        jurisdiction_name: &str,
        import: VocabularyImport,
        options: &ImportOptions,
    ) -> Result<(crate::model::ControlledVocabulary, ImportReport), RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let (store, rng) = self.parts();
        ingest::import_vocabulary(store, rng, &juri.id, import, options)
    }

    /// Append terms to an existing vocabulary identified by name.
    pub fn add_terms(
        &mut self,
        jurisdiction_name: &str,
        vocabulary_name: &str,
        terms: Vec<ingest::TermRecord>,
        options: &ImportOptions,
    ) -> Result<(crate::model::ControlledVocabulary, ImportReport), RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let (store, rng) = self.parts();
        ingest::add_terms(store, rng, &juri.id, vocabulary_name, terms, options)
    }

    pub fn import_document(
        &mut self,
        jurisdiction_name: &str,
        import: DocumentImport,
    ) -> Result<(StandardsDocument, ImportReport), RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let (store, rng) = self.parts();
        ingest::import_document(store, rng, &juri.id, import)
    }

    pub fn import_collection(
        &mut self,
        jurisdiction_name: &str,
        import: CollectionImport,
    ) -> Result<(ContentCollection, ImportReport), RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let (store, rng) = self.parts();
        ingest::import_collection(store, rng, &juri.id, import)
    }

    /// Create a term relation. Both endpoints (when internal) must belong
    /// to vocabularies of the named jurisdiction.
    pub fn create_term_relation(
        &mut self,
        jurisdiction_name: &str,
        new: NewTermRelation,
    ) -> Result<TermRelation, RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        self.check_term_in(&juri.id, &new.source)?;
        if let Some(target) = &new.target {
            self.check_term_in(&juri.id, target)?;
        }
        let (store, rng) = self.parts();
        let id = loop {
            let id = TermRelationId::generate(rng);
            if store.term_relation(&id)?.is_none() {
                break id;
            }
        };
        let rel = TermRelation {
            id,
            jurisdiction: juri.id,
            source: new.source,
            target: new.target,
            target_uri: new.target_uri,
            kind: new.kind,
            notes: new.notes,
        };
        rel.validate()?;
        store.insert_term_relation(rel.clone())?;
        Ok(rel)
    }

    fn check_term_in(
        &self,
        jurisdiction: &JurisdictionId,
        term: &TermId,
    ) -> Result<(), RegistryError> {
        let term_row = self
            .store()
            .term(term)?
            .ok_or_else(|| RegistryError::NotFound(term.0.clone()))?;
        let vocab = self
            .store()
            .vocabulary(&term_row.vocabulary)?
            .ok_or_else(|| RegistryError::NotFound(term_row.vocabulary.0.clone()))?;
        if vocab.jurisdiction == *jurisdiction {
            Ok(())
        } else {
            Err(RegistryError::CrossTenantReference(term.0.clone()))
        }
    }

    pub fn create_crosswalk(
        &mut self,
        jurisdiction_name: &str,
        new: NewCrosswalk,
    ) -> Result<StandardsCrosswalk, RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let (store, rng) = self.parts();
        let id = loop {
            let id = CrosswalkId::generate(rng);
            if store.crosswalk(&id)?.is_none() {
                break id;
            }
        };
        let cw = StandardsCrosswalk {
            id,
            jurisdiction: juri.id,
            title: new.title,
            description: new.description,
            creator: new.creator,
            publisher: new.publisher,
            version: new.version,
            ..StandardsCrosswalk::default()
        };
        store.insert_crosswalk(cw.clone())?;
        Ok(cw)
    }

    /// Create a standard node relation under a crosswalk of the named
    /// jurisdiction. Endpoints may live in any document; crosswalks exist
    /// to map between documents, including other tenants' published ones.
    pub fn create_standard_node_relation(
        &mut self,
        jurisdiction_name: &str,
        new: NewStandardNodeRelation,
    ) -> Result<StandardNodeRelation, RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let cw = self
            .store()
            .crosswalk(&new.crosswalk)?
            .ok_or_else(|| RegistryError::NotFound(new.crosswalk.0.clone()))?;
        if cw.jurisdiction != juri.id {
            return Err(RegistryError::CrossTenantReference(new.crosswalk.0.clone()));
        }
        for endpoint in [&new.source, &new.target] {
            if self.store().standard_node(endpoint)?.is_none() {
                return Err(RegistryError::NotFound(endpoint.0.clone()));
            }
        }
        let (store, rng) = self.parts();
        let id = loop {
            let id = StandardNodeRelationId::generate(rng);
            if store.standard_node_relation(&id)?.is_none() {
                break id;
            }
        };
        let rel = StandardNodeRelation {
            id,
            crosswalk: new.crosswalk,
            source: new.source,
            target: new.target,
            kind: new.kind,
            notes: new.notes,
        };
        store.insert_standard_node_relation(rel.clone())?;
        Ok(rel)
    }

    pub fn create_correlation(
        &mut self,
        jurisdiction_name: &str,
        new: NewCorrelation,
    ) -> Result<ContentCorrelation, RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let (store, rng) = self.parts();
        let id = loop {
            let id = CorrelationId::generate(rng);
            if store.correlation(&id)?.is_none() {
                break id;
            }
        };
        let corr = ContentCorrelation {
            id,
            jurisdiction: juri.id,
            title: new.title,
            description: new.description,
            creator: new.creator,
            publisher: new.publisher,
            version: new.version,
            ..ContentCorrelation::default()
        };
        store.insert_correlation(corr.clone())?;
        Ok(corr)
    }

    pub fn create_content_standard_relation(
        &mut self,
        jurisdiction_name: &str,
        new: NewContentStandardRelation,
    ) -> Result<ContentStandardRelation, RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let corr = self
            .store()
            .correlation(&new.correlation)?
            .ok_or_else(|| RegistryError::NotFound(new.correlation.0.clone()))?;
        if corr.jurisdiction != juri.id {
            return Err(RegistryError::CrossTenantReference(
                new.correlation.0.clone(),
            ));
        }
        if self.store().content_node(&new.source)?.is_none() {
            return Err(RegistryError::NotFound(new.source.0.clone()));
        }
        if self.store().standard_node(&new.target)?.is_none() {
            return Err(RegistryError::NotFound(new.target.0.clone()));
        }
        let (store, rng) = self.parts();
        let id = loop {
            let id = ContentStandardRelationId::generate(rng);
            if store.content_standard_relation(&id)?.is_none() {
                break id;
            }
        };
        let rel = ContentStandardRelation {
            id,
            correlation: new.correlation,
            source: new.source,
            target: new.target,
            kind: new.kind,
            notes: new.notes,
        };
        store.insert_content_standard_relation(rel.clone())?;
        Ok(rel)
    }

    /// Create one standard node. Root when `parent` is absent; otherwise
    /// appended as the last child of `parent`.
    pub fn create_standard_node(
        &mut self,
        jurisdiction_name: &str,
        new: NewStandardNode,
    ) -> Result<StandardNode, RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let doc = self
            .store()
            .document(&new.document)?
            .ok_or_else(|| RegistryError::NotFound(new.document.0.clone()))?;
        if doc.jurisdiction != juri.id {
            return Err(RegistryError::CrossTenantReference(new.document.0.clone()));
        }
        if let Some(parent) = &new.parent {
            let parent_row = self
                .store()
                .standard_node(parent)?
                .ok_or_else(|| RegistryError::NotFound(parent.0.clone()))?;
            if parent_row.document != new.document {
                return Err(RegistryError::Validation(format!(
                    "parent {parent} belongs to a different document"
                )));
            }
        }
        let (store, rng) = self.parts();
        let id = loop {
            let id = StandardNodeId::generate(rng);
            if store.standard_node(&id)?.is_none() {
                break id;
            }
        };
        let node = StandardNode {
            id,
            document: new.document,
            kind: new.kind,
            notation: new.notation,
            list_id: new.list_id,
            title: new.title,
            description: new.description,
            language: new.language,
            notes: new.notes,
            ..StandardNode::default()
        };
        match new.parent {
            None => tree::insert_standard_root(store, node),
            Some(parent) => tree::attach_standard_child(store, node, &parent, Placement::Last),
        }
    }

    /// Create one content node. Root when `parent` is absent; otherwise
    /// appended as the last child of `parent`.
    pub fn create_content_node(
        &mut self,
        jurisdiction_name: &str,
        new: NewContentNode,
    ) -> Result<ContentNode, RegistryError> {
        let juri = self.jurisdiction_named(jurisdiction_name)?;
        let coll = self
            .store()
            .collection(&new.collection)?
            .ok_or_else(|| RegistryError::NotFound(new.collection.0.clone()))?;
        if coll.jurisdiction != juri.id {
            return Err(RegistryError::CrossTenantReference(
                new.collection.0.clone(),
            ));
        }
        if let Some(parent) = &new.parent {
            let parent_row = self
                .store()
                .content_node(parent)?
                .ok_or_else(|| RegistryError::NotFound(parent.0.clone()))?;
            if parent_row.collection != new.collection {
                return Err(RegistryError::Validation(format!(
                    "parent {parent} belongs to a different collection"
                )));
            }
        }
        let (store, rng) = self.parts();
        let id = loop {
            let id = ContentNodeId::generate(rng);
            if store.content_node(&id)?.is_none() {
                break id;
            }
        };
        let node = ContentNode {
            id,
            collection: new.collection,
            title: new.title,
            description: new.description,
            content_kind: new.content_kind,
            source_id: new.source_id,
            source_url: new.source_url,
            language: new.language,
            ..ContentNode::default()
        };
        match new.parent {
            None => tree::insert_content_root(store, node),
            Some(parent) => tree::attach_content_child(store, node, &parent, Placement::Last),
        }
    }

    // -- deletion -------------------------------------------------------------

    /// Delete the entity a canonical URI addresses. Node deletes take their
    /// whole subtree; owner deletes cascade to everything they contain.
    pub fn delete(&mut self, uri: &str) -> Result<(), RegistryError> {
        let entity = self.resolve(uri)?;
        let store = self.store_mut();
        match entity {
            Resolved::Jurisdiction(j) => store.delete_jurisdiction(&j.id),
            Resolved::Vocabulary(v) => store.delete_vocabulary(&v.id),
            Resolved::Term(t) => store.delete_term(&t.id),
            Resolved::TermRelation(r) => store.delete_term_relation(&r.id),
            Resolved::Document(d) => store.delete_document(&d.id),
            Resolved::StandardNode(n) => {
                tree::delete_standard_subtree(store, &n.id).map(|_| ())
            }
            Resolved::Crosswalk(c) => store.delete_crosswalk(&c.id),
            Resolved::StandardNodeRelation(r) => store.delete_standard_node_relation(&r.id),
            Resolved::Collection(c) => store.delete_collection(&c.id),
            Resolved::ContentNode(n) => tree::delete_content_subtree(store, &n.id).map(|_| ()),
            Resolved::Correlation(c) => store.delete_correlation(&c.id),
            Resolved::ContentStandardRelation(r) => {
                store.delete_content_standard_relation(&r.id)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{ContentNodeRecord, NodeRecord, TermRecord};

    fn seeded() -> Registry {
        let mut registry = Registry::in_memory();
        registry
            .create_jurisdiction(NewJurisdiction {
                name: "Ghana".to_string(),
                display_name: "Ghana NaCCA".to_string(),
                ..NewJurisdiction::default()
            })
            .expect("jurisdiction");
        registry
            .import_vocabulary(
                "Ghana",
                VocabularyImport {
                    name: "GradeLevels".to_string(),
                    label: "Grade Levels".to_string(),
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
                },
                &ImportOptions::default(),
            )
            .expect("vocabulary");
        registry
    }

    #[test]
    fn end_to_end_term_resolution_with_links() {
        let registry = seeded();
        let entity = registry
            .resolve("/Ghana/terms/GradeLevels/B2/2")
            .expect("resolve");
        assert_eq!(
            registry.canonical_uri(&entity).expect("uri"),
            "/Ghana/terms/GradeLevels/B2/2"
        );
        let links = registry.links(&entity).expect("links");
        assert!(
            links
                .iter()
                .any(|l| l.field == "parent" && l.uri == "/Ghana/terms/GradeLevels/B2")
        );
    }

    #[test]
    fn second_root_via_facade_conflicts() {
        let mut registry = seeded();
        let (doc, _) = registry
            .import_document(
                "Ghana",
                DocumentImport {
                    name: "GhanaMath".to_string(),
                    title: "Mathematics".to_string(),
                    root: NodeRecord {
                        description: "Mathematics".to_string(),
                        ..NodeRecord::default()
                    },
                    ..DocumentImport::default()
                },
            )
            .expect("import");
        let err = registry.create_standard_node(
            "Ghana",
            NewStandardNode {
                document: doc.id,
                parent: None,
                description: "another root".to_string(),
                ..NewStandardNode::default()
            },
        );
        assert!(matches!(err, Err(RegistryError::DuplicateRoot(_))));
    }

    #[test]
    fn relation_endpoints_are_tenant_checked() {
        let mut registry = seeded();
        registry
            .create_jurisdiction(NewJurisdiction {
                name: "Kenya".to_string(),
                display_name: "KICD".to_string(),
                ..NewJurisdiction::default()
            })
            .expect("jurisdiction");
        let Resolved::Term(ghana_term) = registry
            .resolve("/Ghana/terms/GradeLevels/B2")
            .expect("resolve")
        else {
            panic!("expected a term");
        };
        // Kenya cannot hang a relation off Ghana's term.
        let err = registry.create_term_relation(
            "Kenya",
            NewTermRelation {
                source: ghana_term.id,
                target: None,
                target_uri: Some("https://example.org/grade2".to_string()),
                kind: TermRelationKind::ExactMatch,
                notes: None,
            },
        );
        assert!(matches!(err, Err(RegistryError::CrossTenantReference(_))));
    }

    #[test]
    fn uri_deletion_takes_subtrees() {
        let mut registry = seeded();
        registry
            .import_collection(
                "Ghana",
                CollectionImport {
                    name: "KhanAcademy".to_string(),
                    root: ContentNodeRecord {
                        title: "Khan Academy".to_string(),
                        children: vec![ContentNodeRecord {
                            title: "Arithmetic".to_string(),
                            ..ContentNodeRecord::default()
                        }],
                        ..ContentNodeRecord::default()
                    },
                    ..CollectionImport::default()
                },
            )
            .expect("import");
        let before = registry.counts().expect("counts");
        assert_eq!(before.content_nodes, 2);

        let juri = registry.list_jurisdictions().expect("list").remove(0);
        let coll = registry
            .store()
            .collections_in(&juri.id)
            .expect("collections")
            .remove(0);
        let root = registry
            .store()
            .collection_root(&coll.id)
            .expect("read")
            .expect("root");
        let root_uri = registry
            .canonical_uri(&Resolved::ContentNode(root))
            .expect("uri");
        registry.delete(&root_uri).expect("delete subtree");
        let after = registry.counts().expect("counts");
        assert_eq!(after.content_nodes, 0);
        // The collection row itself stays.
        assert_eq!(after.collections, 1);
    }
}
