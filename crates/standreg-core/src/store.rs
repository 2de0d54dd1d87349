//! # Registry Storage
//!
//! The [`RegistryStore`] trait abstracts over storage backends, and
//! [`MemStore`] is the in-memory implementation (fast, volatile).
//!
//! The store is where the relational-style constraints live:
//! - unique jurisdiction `name`
//! - unique `(jurisdiction, name)` per vocabulary
//! - unique `(vocabulary, path)` per term
//! - unique document `name`
//! - at most one root node per document/collection (the conditional unique
//!   constraint behind `DuplicateRoot`)
//!
//! Deletes cascade down the ownership tree and remove any relation edges
//! that reference deleted rows. Uses `BTreeMap` throughout so listings are
//! deterministically ordered.

use crate::model::{
    ContentCollection, ContentCorrelation, ContentNode, ContentStandardRelation,
    ControlledVocabulary, Jurisdiction, StandardNode, StandardNodeRelation, StandardsCrosswalk,
    StandardsDocument, Term, TermRelation,
};
use crate::types::{
    CollectionId, ContentNodeId, ContentStandardRelationId, CorrelationId, CrosswalkId,
    DocumentId, JurisdictionId, RegistryError, StandardNodeId, StandardNodeRelationId, TermId,
    TermRelationId, VocabularyId,
};
use std::collections::BTreeMap;

// =============================================================================
// COUNTS
// =============================================================================

/// Row counts per entity kind, used by the status endpoint and CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryCounts {
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
// STORE TRAIT
// =============================================================================

/// Storage backend interface for the registry.
///
/// All mutation methods enforce the natural-key constraints listed in the
/// module docs and return [`RegistryError::Conflict`] /
/// [`RegistryError::DuplicateRoot`] on violation. Reads return `Ok(None)`
/// for missing rows; only storage faults surface as errors.
pub trait RegistryStore: Send + Sync {
    // -- jurisdictions --------------------------------------------------------
    fn insert_jurisdiction(&mut self, juri: Jurisdiction) -> Result<(), RegistryError>;
    fn jurisdiction(&self, id: &JurisdictionId) -> Result<Option<Jurisdiction>, RegistryError>;
    fn jurisdiction_by_name(&self, name: &str) -> Result<Option<Jurisdiction>, RegistryError>;
    fn list_jurisdictions(&self) -> Result<Vec<Jurisdiction>, RegistryError>;
    fn update_jurisdiction(&mut self, juri: Jurisdiction) -> Result<(), RegistryError>;
    fn delete_jurisdiction(&mut self, id: &JurisdictionId) -> Result<(), RegistryError>;

    // -- vocabularies ---------------------------------------------------------
    fn insert_vocabulary(&mut self, vocab: ControlledVocabulary) -> Result<(), RegistryError>;
    fn vocabulary(&self, id: &VocabularyId) -> Result<Option<ControlledVocabulary>, RegistryError>;
    fn vocabulary_by_key(
        &self,
        jurisdiction: &JurisdictionId,
        name: &str,
    ) -> Result<Option<ControlledVocabulary>, RegistryError>;
    fn vocabularies_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ControlledVocabulary>, RegistryError>;
    fn update_vocabulary(&mut self, vocab: ControlledVocabulary) -> Result<(), RegistryError>;
    fn delete_vocabulary(&mut self, id: &VocabularyId) -> Result<(), RegistryError>;

    // -- terms ----------------------------------------------------------------
    fn insert_term(&mut self, term: Term) -> Result<(), RegistryError>;
    fn term(&self, id: &TermId) -> Result<Option<Term>, RegistryError>;
    fn term_by_path(
        &self,
        vocabulary: &VocabularyId,
        path: &str,
    ) -> Result<Option<Term>, RegistryError>;
    /// Terms of a vocabulary, ordered by (depth, sort_order, path).
    fn terms_in(&self, vocabulary: &VocabularyId) -> Result<Vec<Term>, RegistryError>;
    fn update_term(&mut self, term: Term) -> Result<(), RegistryError>;
    fn delete_term(&mut self, id: &TermId) -> Result<(), RegistryError>;

    // -- term relations -------------------------------------------------------
    fn insert_term_relation(&mut self, rel: TermRelation) -> Result<(), RegistryError>;
    fn term_relation(&self, id: &TermRelationId) -> Result<Option<TermRelation>, RegistryError>;
    fn term_relations_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<TermRelation>, RegistryError>;
    fn delete_term_relation(&mut self, id: &TermRelationId) -> Result<(), RegistryError>;

    // -- documents ------------------------------------------------------------
    fn insert_document(&mut self, doc: StandardsDocument) -> Result<(), RegistryError>;
    fn document(&self, id: &DocumentId) -> Result<Option<StandardsDocument>, RegistryError>;
    fn document_by_name(&self, name: &str) -> Result<Option<StandardsDocument>, RegistryError>;
    fn documents_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<StandardsDocument>, RegistryError>;
    fn delete_document(&mut self, id: &DocumentId) -> Result<(), RegistryError>;

    // -- standard nodes -------------------------------------------------------
    /// Insert a node. A root insert (parent `None`) fails with
    /// [`RegistryError::DuplicateRoot`] if the document already has one.
    fn insert_standard_node(&mut self, node: StandardNode) -> Result<(), RegistryError>;
    fn standard_node(&self, id: &StandardNodeId) -> Result<Option<StandardNode>, RegistryError>;
    fn document_root(&self, document: &DocumentId) -> Result<Option<StandardNode>, RegistryError>;
    /// Children of a node, ordered by sort_order.
    fn standard_children(
        &self,
        parent: &StandardNodeId,
    ) -> Result<Vec<StandardNode>, RegistryError>;
    fn standard_nodes_in(
        &self,
        document: &DocumentId,
    ) -> Result<Vec<StandardNode>, RegistryError>;
    /// Delete one node row plus any relation edges referencing it. Subtree
    /// cascades are orchestrated by the tree guard.
    fn delete_standard_node(&mut self, id: &StandardNodeId) -> Result<(), RegistryError>;

    // -- crosswalks and node relations ----------------------------------------
    fn insert_crosswalk(&mut self, cw: StandardsCrosswalk) -> Result<(), RegistryError>;
    fn crosswalk(&self, id: &CrosswalkId) -> Result<Option<StandardsCrosswalk>, RegistryError>;
    fn crosswalks_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<StandardsCrosswalk>, RegistryError>;
    fn delete_crosswalk(&mut self, id: &CrosswalkId) -> Result<(), RegistryError>;
    fn insert_standard_node_relation(
        &mut self,
        rel: StandardNodeRelation,
    ) -> Result<(), RegistryError>;
    fn standard_node_relation(
        &self,
        id: &StandardNodeRelationId,
    ) -> Result<Option<StandardNodeRelation>, RegistryError>;
    fn standard_node_relations_in(
        &self,
        crosswalk: &CrosswalkId,
    ) -> Result<Vec<StandardNodeRelation>, RegistryError>;
    fn delete_standard_node_relation(
        &mut self,
        id: &StandardNodeRelationId,
    ) -> Result<(), RegistryError>;

    // -- collections and content nodes ----------------------------------------
    fn insert_collection(&mut self, coll: ContentCollection) -> Result<(), RegistryError>;
    fn collection(&self, id: &CollectionId) -> Result<Option<ContentCollection>, RegistryError>;
    fn collections_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ContentCollection>, RegistryError>;
    fn delete_collection(&mut self, id: &CollectionId) -> Result<(), RegistryError>;
    /// Insert a node. A root insert (parent `None`) fails with
    /// [`RegistryError::DuplicateRoot`] if the collection already has one.
    fn insert_content_node(&mut self, node: ContentNode) -> Result<(), RegistryError>;
    fn content_node(&self, id: &ContentNodeId) -> Result<Option<ContentNode>, RegistryError>;
    fn collection_root(
        &self,
        collection: &CollectionId,
    ) -> Result<Option<ContentNode>, RegistryError>;
    fn content_children(&self, parent: &ContentNodeId)
    -> Result<Vec<ContentNode>, RegistryError>;
    fn content_nodes_in(
        &self,
        collection: &CollectionId,
    ) -> Result<Vec<ContentNode>, RegistryError>;
    fn delete_content_node(&mut self, id: &ContentNodeId) -> Result<(), RegistryError>;

    // -- correlations and content-standard relations --------------------------
    fn insert_correlation(&mut self, corr: ContentCorrelation) -> Result<(), RegistryError>;
    fn correlation(&self, id: &CorrelationId)
    -> Result<Option<ContentCorrelation>, RegistryError>;
    fn correlations_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ContentCorrelation>, RegistryError>;
    fn delete_correlation(&mut self, id: &CorrelationId) -> Result<(), RegistryError>;
    fn insert_content_standard_relation(
        &mut self,
        rel: ContentStandardRelation,
    ) -> Result<(), RegistryError>;
    fn content_standard_relation(
        &self,
        id: &ContentStandardRelationId,
    ) -> Result<Option<ContentStandardRelation>, RegistryError>;
    fn content_standard_relations_in(
        &self,
        correlation: &CorrelationId,
    ) -> Result<Vec<ContentStandardRelation>, RegistryError>;
    fn delete_content_standard_relation(
        &mut self,
        id: &ContentStandardRelationId,
    ) -> Result<(), RegistryError>;

    // -- metrics --------------------------------------------------------------
    fn counts(&self) -> Result<RegistryCounts, RegistryError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// In-memory registry store backed by `BTreeMap`s.
///
/// Natural-key indexes are kept alongside the row maps, mirroring the index
/// tables of the persistent backend.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    jurisdictions: BTreeMap<String, Jurisdiction>,
    juri_by_name: BTreeMap<String, String>,
    vocabularies: BTreeMap<String, ControlledVocabulary>,
    vocab_by_key: BTreeMap<(String, String), String>,
    terms: BTreeMap<String, Term>,
    term_by_path: BTreeMap<(String, String), String>,
    term_relations: BTreeMap<String, TermRelation>,
    documents: BTreeMap<String, StandardsDocument>,
    doc_by_name: BTreeMap<String, String>,
    standard_nodes: BTreeMap<String, StandardNode>,
    doc_root: BTreeMap<String, String>,
    crosswalks: BTreeMap<String, StandardsCrosswalk>,
    standard_node_relations: BTreeMap<String, StandardNodeRelation>,
    collections: BTreeMap<String, ContentCollection>,
    content_nodes: BTreeMap<String, ContentNode>,
    collection_root: BTreeMap<String, String>,
    correlations: BTreeMap<String, ContentCorrelation>,
    content_standard_relations: BTreeMap<String, ContentStandardRelation>,
}

impl MemStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sort_by_order<T, F: Fn(&T) -> f64>(mut rows: Vec<T>, key: F) -> Vec<T> {
        rows.sort_by(|a, b| key(a).total_cmp(&key(b)));
        rows
    }
}

impl RegistryStore for MemStore {
    // -- jurisdictions --------------------------------------------------------

    fn insert_jurisdiction(&mut self, juri: Jurisdiction) -> Result<(), RegistryError> {
        if self.juri_by_name.contains_key(&juri.name) {
            return Err(RegistryError::Conflict(format!(
                "jurisdiction name {:?} already exists",
                juri.name
            )));
        }
        self.juri_by_name
            .insert(juri.name.clone(), juri.id.0.clone());
        self.jurisdictions.insert(juri.id.0.clone(), juri);
        Ok(())
    }

    fn jurisdiction(&self, id: &JurisdictionId) -> Result<Option<Jurisdiction>, RegistryError> {
        Ok(self.jurisdictions.get(&id.0).cloned())
    }

    fn jurisdiction_by_name(&self, name: &str) -> Result<Option<Jurisdiction>, RegistryError> {
        Ok(self
            .juri_by_name
            .get(name)
            .and_then(|id| self.jurisdictions.get(id))
            .cloned())
    }

    fn list_jurisdictions(&self) -> Result<Vec<Jurisdiction>, RegistryError> {
        Ok(self.jurisdictions.values().cloned().collect())
    }

    fn update_jurisdiction(&mut self, juri: Jurisdiction) -> Result<(), RegistryError> {
        let Some(existing) = self.jurisdictions.get(&juri.id.0).cloned() else {
            return Err(RegistryError::NotFound(juri.id.0));
        };
        if existing.name != juri.name {
            if self.juri_by_name.contains_key(&juri.name) {
                return Err(RegistryError::Conflict(format!(
                    "jurisdiction name {:?} already exists",
                    juri.name
                )));
            }
            self.juri_by_name.remove(&existing.name);
            self.juri_by_name
                .insert(juri.name.clone(), juri.id.0.clone());
        }
        self.jurisdictions.insert(juri.id.0.clone(), juri);
        Ok(())
    }

    fn delete_jurisdiction(&mut self, id: &JurisdictionId) -> Result<(), RegistryError> {
        let Some(juri) = self.jurisdictions.remove(&id.0) else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        self.juri_by_name.remove(&juri.name);

        let vocab_ids: Vec<VocabularyId> = self
            .vocabularies
            .values()
            .filter(|v| v.jurisdiction == *id)
            .map(|v| v.id.clone())
            .collect();
        for vid in vocab_ids {
            self.delete_vocabulary(&vid)?;
        }
        self.term_relations.retain(|_, r| r.jurisdiction != *id);

        let doc_ids: Vec<DocumentId> = self
            .documents
            .values()
            .filter(|d| d.jurisdiction == *id)
            .map(|d| d.id.clone())
            .collect();
        for did in doc_ids {
            self.delete_document(&did)?;
        }

        let cw_ids: Vec<CrosswalkId> = self
            .crosswalks
            .values()
            .filter(|c| c.jurisdiction == *id)
            .map(|c| c.id.clone())
            .collect();
        for cid in cw_ids {
            self.delete_crosswalk(&cid)?;
        }

        let coll_ids: Vec<CollectionId> = self
            .collections
            .values()
            .filter(|c| c.jurisdiction == *id)
            .map(|c| c.id.clone())
            .collect();
        for cid in coll_ids {
            self.delete_collection(&cid)?;
        }

        let corr_ids: Vec<CorrelationId> = self
            .correlations
            .values()
            .filter(|c| c.jurisdiction == *id)
            .map(|c| c.id.clone())
            .collect();
        for cid in corr_ids {
            self.delete_correlation(&cid)?;
        }
        Ok(())
    }

    // -- vocabularies ---------------------------------------------------------

    fn insert_vocabulary(&mut self, vocab: ControlledVocabulary) -> Result<(), RegistryError> {
        let key = (vocab.jurisdiction.0.clone(), vocab.name.clone());
        if self.vocab_by_key.contains_key(&key) {
            return Err(RegistryError::Conflict(format!(
                "vocabulary {:?} already exists in jurisdiction {}",
                vocab.name, vocab.jurisdiction
            )));
        }
        self.vocab_by_key.insert(key, vocab.id.0.clone());
        self.vocabularies.insert(vocab.id.0.clone(), vocab);
        Ok(())
    }

    fn vocabulary(
        &self,
        id: &VocabularyId,
    ) -> Result<Option<ControlledVocabulary>, RegistryError> {
        Ok(self.vocabularies.get(&id.0).cloned())
    }

    fn vocabulary_by_key(
        &self,
        jurisdiction: &JurisdictionId,
        name: &str,
    ) -> Result<Option<ControlledVocabulary>, RegistryError> {
        Ok(self
            .vocab_by_key
            .get(&(jurisdiction.0.clone(), name.to_string()))
            .and_then(|id| self.vocabularies.get(id))
            .cloned())
    }

    fn vocabularies_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ControlledVocabulary>, RegistryError> {
        Ok(self
            .vocabularies
            .values()
            .filter(|v| v.jurisdiction == *jurisdiction)
            .cloned()
            .collect())
    }

    fn update_vocabulary(&mut self, vocab: ControlledVocabulary) -> Result<(), RegistryError> {
        let Some(existing) = self.vocabularies.get(&vocab.id.0).cloned() else {
            return Err(RegistryError::NotFound(vocab.id.0));
        };
        let old_key = (existing.jurisdiction.0.clone(), existing.name.clone());
        let new_key = (vocab.jurisdiction.0.clone(), vocab.name.clone());
        if old_key != new_key {
            if self.vocab_by_key.contains_key(&new_key) {
                return Err(RegistryError::Conflict(format!(
                    "vocabulary {:?} already exists in jurisdiction {}",
                    vocab.name, vocab.jurisdiction
                )));
            }
            self.vocab_by_key.remove(&old_key);
            self.vocab_by_key.insert(new_key, vocab.id.0.clone());
        }
        self.vocabularies.insert(vocab.id.0.clone(), vocab);
        Ok(())
    }

    fn delete_vocabulary(&mut self, id: &VocabularyId) -> Result<(), RegistryError> {
        let Some(vocab) = self.vocabularies.remove(&id.0) else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        self.vocab_by_key
            .remove(&(vocab.jurisdiction.0.clone(), vocab.name.clone()));
        let term_ids: Vec<TermId> = self
            .terms
            .values()
            .filter(|t| t.vocabulary == *id)
            .map(|t| t.id.clone())
            .collect();
        for tid in term_ids {
            self.delete_term(&tid)?;
        }
        Ok(())
    }

    // -- terms ----------------------------------------------------------------

    fn insert_term(&mut self, term: Term) -> Result<(), RegistryError> {
        let key = (term.vocabulary.0.clone(), term.path.clone());
        if self.term_by_path.contains_key(&key) {
            return Err(RegistryError::Conflict(format!(
                "term path {:?} already exists in vocabulary {}",
                term.path, term.vocabulary
            )));
        }
        self.term_by_path.insert(key, term.id.0.clone());
        self.terms.insert(term.id.0.clone(), term);
        Ok(())
    }

    fn term(&self, id: &TermId) -> Result<Option<Term>, RegistryError> {
        Ok(self.terms.get(&id.0).cloned())
    }

    fn term_by_path(
        &self,
        vocabulary: &VocabularyId,
        path: &str,
    ) -> Result<Option<Term>, RegistryError> {
        Ok(self
            .term_by_path
            .get(&(vocabulary.0.clone(), path.to_string()))
            .and_then(|id| self.terms.get(id))
            .cloned())
    }

    fn terms_in(&self, vocabulary: &VocabularyId) -> Result<Vec<Term>, RegistryError> {
        let mut rows: Vec<Term> = self
            .terms
            .values()
            .filter(|t| t.vocabulary == *vocabulary)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            crate::path::depth(&a.path)
                .cmp(&crate::path::depth(&b.path))
                .then(a.sort_order.total_cmp(&b.sort_order))
                .then(a.path.cmp(&b.path))
        });
        Ok(rows)
    }

    fn update_term(&mut self, term: Term) -> Result<(), RegistryError> {
        let Some(existing) = self.terms.get(&term.id.0).cloned() else {
            return Err(RegistryError::NotFound(term.id.0));
        };
        let old_key = (existing.vocabulary.0.clone(), existing.path.clone());
        let new_key = (term.vocabulary.0.clone(), term.path.clone());
        if old_key != new_key {
            if self.term_by_path.contains_key(&new_key) {
                return Err(RegistryError::Conflict(format!(
                    "term path {:?} already exists in vocabulary {}",
                    term.path, term.vocabulary
                )));
            }
            self.term_by_path.remove(&old_key);
            self.term_by_path.insert(new_key, term.id.0.clone());
        }
        self.terms.insert(term.id.0.clone(), term);
        Ok(())
    }

    fn delete_term(&mut self, id: &TermId) -> Result<(), RegistryError> {
        let Some(term) = self.terms.remove(&id.0) else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        self.term_by_path
            .remove(&(term.vocabulary.0.clone(), term.path.clone()));
        // Cascade relation edges; null out weak kind references (SET NULL).
        self.term_relations
            .retain(|_, r| r.source != *id && r.target.as_ref() != Some(id));
        for node in self.standard_nodes.values_mut() {
            if node.kind.as_ref() == Some(id) {
                node.kind = None;
            }
        }
        for rel in self.standard_node_relations.values_mut() {
            if rel.kind.as_ref() == Some(id) {
                rel.kind = None;
            }
        }
        for rel in self.content_standard_relations.values_mut() {
            if rel.kind.as_ref() == Some(id) {
                rel.kind = None;
            }
        }
        Ok(())
    }

    // -- term relations -------------------------------------------------------

    fn insert_term_relation(&mut self, rel: TermRelation) -> Result<(), RegistryError> {
        self.term_relations.insert(rel.id.0.clone(), rel);
        Ok(())
    }

    fn term_relation(
        &self,
        id: &TermRelationId,
    ) -> Result<Option<TermRelation>, RegistryError> {
        Ok(self.term_relations.get(&id.0).cloned())
    }

    fn term_relations_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<TermRelation>, RegistryError> {
        Ok(self
            .term_relations
            .values()
            .filter(|r| r.jurisdiction == *jurisdiction)
            .cloned()
            .collect())
    }

    fn delete_term_relation(&mut self, id: &TermRelationId) -> Result<(), RegistryError> {
        self.term_relations
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(id.0.clone()))
    }

    // -- documents ------------------------------------------------------------

    fn insert_document(&mut self, doc: StandardsDocument) -> Result<(), RegistryError> {
        if self.doc_by_name.contains_key(&doc.name) {
            return Err(RegistryError::Conflict(format!(
                "document name {:?} already exists",
                doc.name
            )));
        }
        self.doc_by_name.insert(doc.name.clone(), doc.id.0.clone());
        self.documents.insert(doc.id.0.clone(), doc);
        Ok(())
    }

    fn document(&self, id: &DocumentId) -> Result<Option<StandardsDocument>, RegistryError> {
        Ok(self.documents.get(&id.0).cloned())
    }

    fn document_by_name(&self, name: &str) -> Result<Option<StandardsDocument>, RegistryError> {
        Ok(self
            .doc_by_name
            .get(name)
            .and_then(|id| self.documents.get(id))
            .cloned())
    }

    fn documents_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<StandardsDocument>, RegistryError> {
        Ok(self
            .documents
            .values()
            .filter(|d| d.jurisdiction == *jurisdiction)
            .cloned()
            .collect())
    }

    fn delete_document(&mut self, id: &DocumentId) -> Result<(), RegistryError> {
        let Some(doc) = self.documents.remove(&id.0) else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        self.doc_by_name.remove(&doc.name);
        self.doc_root.remove(&id.0);
        let node_ids: Vec<String> = self
            .standard_nodes
            .values()
            .filter(|n| n.document == *id)
            .map(|n| n.id.0.clone())
            .collect();
        for nid in &node_ids {
            self.standard_nodes.remove(nid);
        }
        self.standard_node_relations
            .retain(|_, r| !node_ids.contains(&r.source.0) && !node_ids.contains(&r.target.0));
        self.content_standard_relations
            .retain(|_, r| !node_ids.contains(&r.target.0));
        Ok(())
    }

    // -- standard nodes -------------------------------------------------------

    fn insert_standard_node(&mut self, node: StandardNode) -> Result<(), RegistryError> {
        if node.parent.is_none() {
            if self.doc_root.contains_key(&node.document.0) {
                return Err(RegistryError::DuplicateRoot(node.document.0));
            }
            self.doc_root
                .insert(node.document.0.clone(), node.id.0.clone());
        }
        self.standard_nodes.insert(node.id.0.clone(), node);
        Ok(())
    }

    fn standard_node(
        &self,
        id: &StandardNodeId,
    ) -> Result<Option<StandardNode>, RegistryError> {
        Ok(self.standard_nodes.get(&id.0).cloned())
    }

    fn document_root(
        &self,
        document: &DocumentId,
    ) -> Result<Option<StandardNode>, RegistryError> {
        Ok(self
            .doc_root
            .get(&document.0)
            .and_then(|id| self.standard_nodes.get(id))
            .cloned())
    }

    fn standard_children(
        &self,
        parent: &StandardNodeId,
    ) -> Result<Vec<StandardNode>, RegistryError> {
        let rows: Vec<StandardNode> = self
            .standard_nodes
            .values()
            .filter(|n| n.parent.as_ref() == Some(parent))
            .cloned()
            .collect();
        Ok(Self::sort_by_order(rows, |n| n.sort_order))
    }

    fn standard_nodes_in(
        &self,
        document: &DocumentId,
    ) -> Result<Vec<StandardNode>, RegistryError> {
        Ok(self
            .standard_nodes
            .values()
            .filter(|n| n.document == *document)
            .cloned()
            .collect())
    }

    fn delete_standard_node(&mut self, id: &StandardNodeId) -> Result<(), RegistryError> {
        let Some(node) = self.standard_nodes.remove(&id.0) else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        if node.parent.is_none() {
            self.doc_root.remove(&node.document.0);
        }
        self.standard_node_relations
            .retain(|_, r| r.source != *id && r.target != *id);
        self.content_standard_relations.retain(|_, r| r.target != *id);
        Ok(())
    }

    // -- crosswalks and node relations ----------------------------------------

    fn insert_crosswalk(&mut self, cw: StandardsCrosswalk) -> Result<(), RegistryError> {
        self.crosswalks.insert(cw.id.0.clone(), cw);
        Ok(())
    }

    fn crosswalk(&self, id: &CrosswalkId) -> Result<Option<StandardsCrosswalk>, RegistryError> {
        Ok(self.crosswalks.get(&id.0).cloned())
    }

    fn crosswalks_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<StandardsCrosswalk>, RegistryError> {
        Ok(self
            .crosswalks
            .values()
            .filter(|c| c.jurisdiction == *jurisdiction)
            .cloned()
            .collect())
    }

    fn delete_crosswalk(&mut self, id: &CrosswalkId) -> Result<(), RegistryError> {
        if self.crosswalks.remove(&id.0).is_none() {
            return Err(RegistryError::NotFound(id.0.clone()));
        }
        self.standard_node_relations
            .retain(|_, r| r.crosswalk != *id);
        Ok(())
    }

    fn insert_standard_node_relation(
        &mut self,
        rel: StandardNodeRelation,
    ) -> Result<(), RegistryError> {
        self.standard_node_relations.insert(rel.id.0.clone(), rel);
        Ok(())
    }

    fn standard_node_relation(
        &self,
        id: &StandardNodeRelationId,
    ) -> Result<Option<StandardNodeRelation>, RegistryError> {
        Ok(self.standard_node_relations.get(&id.0).cloned())
    }

    fn standard_node_relations_in(
        &self,
        crosswalk: &CrosswalkId,
    ) -> Result<Vec<StandardNodeRelation>, RegistryError> {
        Ok(self
            .standard_node_relations
            .values()
            .filter(|r| r.crosswalk == *crosswalk)
            .cloned()
            .collect())
    }

    fn delete_standard_node_relation(
        &mut self,
        id: &StandardNodeRelationId,
    ) -> Result<(), RegistryError> {
        self.standard_node_relations
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(id.0.clone()))
    }

    // -- collections and content nodes ----------------------------------------

    fn insert_collection(&mut self, coll: ContentCollection) -> Result<(), RegistryError> {
        self.collections.insert(coll.id.0.clone(), coll);
        Ok(())
    }

    fn collection(&self, id: &CollectionId) -> Result<Option<ContentCollection>, RegistryError> {
        Ok(self.collections.get(&id.0).cloned())
    }

    fn collections_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ContentCollection>, RegistryError> {
        Ok(self
            .collections
            .values()
            .filter(|c| c.jurisdiction == *jurisdiction)
            .cloned()
            .collect())
    }

    fn delete_collection(&mut self, id: &CollectionId) -> Result<(), RegistryError> {
        if self.collections.remove(&id.0).is_none() {
            return Err(RegistryError::NotFound(id.0.clone()));
        }
        self.collection_root.remove(&id.0);
        let node_ids: Vec<String> = self
            .content_nodes
            .values()
            .filter(|n| n.collection == *id)
            .map(|n| n.id.0.clone())
            .collect();
        for nid in &node_ids {
            self.content_nodes.remove(nid);
        }
        self.content_standard_relations
            .retain(|_, r| !node_ids.contains(&r.source.0));
        Ok(())
    }

    fn insert_content_node(&mut self, node: ContentNode) -> Result<(), RegistryError> {
        if node.parent.is_none() {
            if self.collection_root.contains_key(&node.collection.0) {
                return Err(RegistryError::DuplicateRoot(node.collection.0));
            }
            self.collection_root
                .insert(node.collection.0.clone(), node.id.0.clone());
        }
        self.content_nodes.insert(node.id.0.clone(), node);
        Ok(())
    }

    fn content_node(&self, id: &ContentNodeId) -> Result<Option<ContentNode>, RegistryError> {
        Ok(self.content_nodes.get(&id.0).cloned())
    }

    fn collection_root(
        &self,
        collection: &CollectionId,
    ) -> Result<Option<ContentNode>, RegistryError> {
        Ok(self
            .collection_root
            .get(&collection.0)
            .and_then(|id| self.content_nodes.get(id))
            .cloned())
    }

    fn content_children(
        &self,
        parent: &ContentNodeId,
    ) -> Result<Vec<ContentNode>, RegistryError> {
        let rows: Vec<ContentNode> = self
            .content_nodes
            .values()
            .filter(|n| n.parent.as_ref() == Some(parent))
            .cloned()
            .collect();
        Ok(Self::sort_by_order(rows, |n| n.sort_order))
    }

    fn content_nodes_in(
        &self,
        collection: &CollectionId,
    ) -> Result<Vec<ContentNode>, RegistryError> {
        Ok(self
            .content_nodes
            .values()
            .filter(|n| n.collection == *collection)
            .cloned()
            .collect())
    }

    fn delete_content_node(&mut self, id: &ContentNodeId) -> Result<(), RegistryError> {
        let Some(node) = self.content_nodes.remove(&id.0) else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        if node.parent.is_none() {
            self.collection_root.remove(&node.collection.0);
        }
        self.content_standard_relations.retain(|_, r| r.source != *id);
        Ok(())
    }

    // -- correlations and content-standard relations --------------------------

    fn insert_correlation(&mut self, corr: ContentCorrelation) -> Result<(), RegistryError> {
        self.correlations.insert(corr.id.0.clone(), corr);
        Ok(())
    }

    fn correlation(
        &self,
        id: &CorrelationId,
    ) -> Result<Option<ContentCorrelation>, RegistryError> {
        Ok(self.correlations.get(&id.0).cloned())
    }

    fn correlations_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ContentCorrelation>, RegistryError> {
        Ok(self
            .correlations
            .values()
            .filter(|c| c.jurisdiction == *jurisdiction)
            .cloned()
            .collect())
    }

    fn delete_correlation(&mut self, id: &CorrelationId) -> Result<(), RegistryError> {
        if self.correlations.remove(&id.0).is_none() {
            return Err(RegistryError::NotFound(id.0.clone()));
        }
        self.content_standard_relations
            .retain(|_, r| r.correlation != *id);
        Ok(())
    }

    fn insert_content_standard_relation(
        &mut self,
        rel: ContentStandardRelation,
    ) -> Result<(), RegistryError> {
        self.content_standard_relations.insert(rel.id.0.clone(), rel);
        Ok(())
    }

    fn content_standard_relation(
        &self,
        id: &ContentStandardRelationId,
    ) -> Result<Option<ContentStandardRelation>, RegistryError> {
        Ok(self.content_standard_relations.get(&id.0).cloned())
    }

    fn content_standard_relations_in(
        &self,
        correlation: &CorrelationId,
    ) -> Result<Vec<ContentStandardRelation>, RegistryError> {
        Ok(self
            .content_standard_relations
            .values()
            .filter(|r| r.correlation == *correlation)
            .cloned()
            .collect())
    }

    fn delete_content_standard_relation(
        &mut self,
        id: &ContentStandardRelationId,
    ) -> Result<(), RegistryError> {
        self.content_standard_relations
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(id.0.clone()))
    }

    // -- metrics --------------------------------------------------------------

    fn counts(&self) -> Result<RegistryCounts, RegistryError> {
        Ok(RegistryCounts {
            jurisdictions: self.jurisdictions.len(),
            vocabularies: self.vocabularies.len(),
            terms: self.terms.len(),
            term_relations: self.term_relations.len(),
            documents: self.documents.len(),
            standard_nodes: self.standard_nodes.len(),
            crosswalks: self.crosswalks.len(),
            standard_node_relations: self.standard_node_relations.len(),
            collections: self.collections.len(),
            content_nodes: self.content_nodes.len(),
            correlations: self.correlations.len(),
            content_standard_relations: self.content_standard_relations.len(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
