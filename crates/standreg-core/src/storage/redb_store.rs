//! # redb-backed Registry Storage
//!
//! A disk-backed [`RegistryStore`] using the redb embedded database,
//! providing ACID transactions and crash safety with zero configuration.
//!
//! Layout: one row table per entity kind keyed by id string, with rows
//! serialized via postcard, plus index tables realizing the natural-key
//! constraints (`juri_by_name`, `vocab_by_key`, `term_by_path`,
//! `doc_by_name`) and the root indexes (`doc_root`, `coll_root`) that
//! enforce the one-root-per-owner rule.
//!
//! Each mutation method runs in its own write transaction. Cascading
//! deletes compose primitive deletes across transactions; the registry
//! facade holds the only handle, so there is never a concurrent writer
//! observing a half-finished cascade.

use crate::model::{
    ContentCollection, ContentCorrelation, ContentNode, ContentStandardRelation,
    ControlledVocabulary, Jurisdiction, StandardNode, StandardNodeRelation, StandardsCrosswalk,
    StandardsDocument, Term, TermRelation,
};
use crate::store::{RegistryCounts, RegistryStore};
use crate::types::{
    CollectionId, ContentNodeId, ContentStandardRelationId, CorrelationId, CrosswalkId,
    DocumentId, JurisdictionId, RegistryError, StandardNodeId, StandardNodeRelationId, TermId,
    TermRelationId, VocabularyId,
};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

// Row tables: id -> postcard-serialized row.
const JURISDICTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("jurisdictions");
const VOCABULARIES: TableDefinition<&str, &[u8]> = TableDefinition::new("vocabularies");
const TERMS: TableDefinition<&str, &[u8]> = TableDefinition::new("terms");
const TERM_RELATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("term_relations");
const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");
const STANDARD_NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("standard_nodes");
const CROSSWALKS: TableDefinition<&str, &[u8]> = TableDefinition::new("crosswalks");
const STANDARD_NODE_RELATIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("standard_node_relations");
const COLLECTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");
const CONTENT_NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("content_nodes");
const CORRELATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("correlations");
const CONTENT_STANDARD_RELATIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("content_standard_relations");

// Natural-key indexes.
const JURI_BY_NAME: TableDefinition<&str, &str> = TableDefinition::new("juri_by_name");
const VOCAB_BY_KEY: TableDefinition<(&str, &str), &str> = TableDefinition::new("vocab_by_key");
const TERM_BY_PATH: TableDefinition<(&str, &str), &str> = TableDefinition::new("term_by_path");
const DOC_BY_NAME: TableDefinition<&str, &str> = TableDefinition::new("doc_by_name");

// Root indexes: owner id -> root node id. A present key is the database
// realization of "this owner already has a root".
const DOC_ROOT: TableDefinition<&str, &str> = TableDefinition::new("doc_root");
const COLL_ROOT: TableDefinition<&str, &str> = TableDefinition::new("coll_root");

fn io_err(e: impl std::fmt::Display) -> RegistryError {
    RegistryError::IoError(e.to_string())
}

fn ser_err(e: impl std::fmt::Display) -> RegistryError {
    RegistryError::SerializationError(e.to_string())
}

/// A disk-backed registry store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a registry database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;
        // Create all tables up front so reads never hit a missing table.
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            for table in [
                JURISDICTIONS,
                VOCABULARIES,
                TERMS,
                TERM_RELATIONS,
                DOCUMENTS,
                STANDARD_NODES,
                CROSSWALKS,
                STANDARD_NODE_RELATIONS,
                COLLECTIONS,
                CONTENT_NODES,
                CORRELATIONS,
                CONTENT_STANDARD_RELATIONS,
            ] {
                let _ = write_txn.open_table(table).map_err(io_err)?;
            }
            for table in [JURI_BY_NAME, DOC_BY_NAME, DOC_ROOT, COLL_ROOT] {
                let _ = write_txn.open_table(table).map_err(io_err)?;
            }
            for table in [VOCAB_BY_KEY, TERM_BY_PATH] {
                let _ = write_txn.open_table(table).map_err(io_err)?;
            }
            write_txn.commit().map_err(io_err)?;
        }
        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), RegistryError> {
        self.db.compact().map_err(io_err)?;
        Ok(())
    }

    // -- row helpers ----------------------------------------------------------

    fn read_row<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
    ) -> Result<Option<T>, RegistryError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table).map_err(io_err)?;
        match table.get(id).map_err(io_err)? {
            Some(guard) => Ok(Some(postcard::from_bytes(guard.value()).map_err(ser_err)?)),
            None => Ok(None),
        }
    }

    fn scan_rows<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
    ) -> Result<Vec<T>, RegistryError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table).map_err(io_err)?;
        let mut rows = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            rows.push(postcard::from_bytes(value.value()).map_err(ser_err)?);
        }
        Ok(rows)
    }

    fn row_count(&self, table: TableDefinition<&str, &[u8]>) -> Result<usize, RegistryError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table).map_err(io_err)?;
        let mut count = 0;
        for entry in table.iter().map_err(io_err)? {
            entry.map_err(io_err)?;
            count += 1;
        }
        Ok(count)
    }

    /// Insert a row and, in the same transaction, an optional single-key
    /// index entry and an optional two-key index entry.
    fn put_row<T: Serialize>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
        row: &T,
        index1: Option<(TableDefinition<&str, &str>, &str)>,
        index2: Option<(TableDefinition<(&str, &str), &str>, (&str, &str))>,
    ) -> Result<(), RegistryError> {
        let bytes = postcard::to_allocvec(row).map_err(ser_err)?;
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut rows = write_txn.open_table(table).map_err(io_err)?;
            rows.insert(id, bytes.as_slice()).map_err(io_err)?;
            if let Some((index_table, key)) = index1 {
                let mut index = write_txn.open_table(index_table).map_err(io_err)?;
                index.insert(key, id).map_err(io_err)?;
            }
            if let Some((index_table, key)) = index2 {
                let mut index = write_txn.open_table(index_table).map_err(io_err)?;
                index.insert(key, id).map_err(io_err)?;
            }
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    /// Remove a row plus its index entries in one transaction. Returns
    /// whether the row existed.
    fn del_row(
        &self,
        table: TableDefinition<&str, &[u8]>,
        id: &str,
        index1: Option<(TableDefinition<&str, &str>, &str)>,
        index2: Option<(TableDefinition<(&str, &str), &str>, (&str, &str))>,
    ) -> Result<bool, RegistryError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let existed;
        {
            let mut rows = write_txn.open_table(table).map_err(io_err)?;
            existed = rows.remove(id).map_err(io_err)?.is_some();
            if let Some((index_table, key)) = index1 {
                let mut index = write_txn.open_table(index_table).map_err(io_err)?;
                index.remove(key).map_err(io_err)?;
            }
            if let Some((index_table, key)) = index2 {
                let mut index = write_txn.open_table(index_table).map_err(io_err)?;
                index.remove(key).map_err(io_err)?;
            }
        }
        write_txn.commit().map_err(io_err)?;
        Ok(existed)
    }

    fn index1_get(
        &self,
        table: TableDefinition<&str, &str>,
        key: &str,
    ) -> Result<Option<String>, RegistryError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table).map_err(io_err)?;
        Ok(table
            .get(key)
            .map_err(io_err)?
            .map(|guard| guard.value().to_string()))
    }

    fn index2_get(
        &self,
        table: TableDefinition<(&str, &str), &str>,
        key: (&str, &str),
    ) -> Result<Option<String>, RegistryError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(table).map_err(io_err)?;
        Ok(table
            .get(key)
            .map_err(io_err)?
            .map(|guard| guard.value().to_string()))
    }
}

impl RegistryStore for RedbStore {
    // -- jurisdictions --------------------------------------------------------

    fn insert_jurisdiction(&mut self, juri: Jurisdiction) -> Result<(), RegistryError> {
        if self.index1_get(JURI_BY_NAME, &juri.name)?.is_some() {
            return Err(RegistryError::Conflict(format!(
                "jurisdiction name {:?} already exists",
                juri.name
            )));
        }
        self.put_row(
            JURISDICTIONS,
            juri.id.as_str(),
            &juri,
            Some((JURI_BY_NAME, &juri.name)),
            None,
        )
    }

    fn jurisdiction(&self, id: &JurisdictionId) -> Result<Option<Jurisdiction>, RegistryError> {
        self.read_row(JURISDICTIONS, id.as_str())
    }

    fn jurisdiction_by_name(&self, name: &str) -> Result<Option<Jurisdiction>, RegistryError> {
        match self.index1_get(JURI_BY_NAME, name)? {
            Some(id) => self.read_row(JURISDICTIONS, &id),
            None => Ok(None),
        }
    }

    fn list_jurisdictions(&self) -> Result<Vec<Jurisdiction>, RegistryError> {
        self.scan_rows(JURISDICTIONS)
    }

    fn update_jurisdiction(&mut self, juri: Jurisdiction) -> Result<(), RegistryError> {
        let Some(existing): Option<Jurisdiction> = self.read_row(JURISDICTIONS, juri.id.as_str())?
        else {
            return Err(RegistryError::NotFound(juri.id.0));
        };
        if existing.name != juri.name {
            if self.index1_get(JURI_BY_NAME, &juri.name)?.is_some() {
                return Err(RegistryError::Conflict(format!(
                    "jurisdiction name {:?} already exists",
                    juri.name
                )));
            }
            self.del_row(
                JURISDICTIONS,
                juri.id.as_str(),
                Some((JURI_BY_NAME, &existing.name)),
                None,
            )?;
        }
        self.put_row(
            JURISDICTIONS,
            juri.id.as_str(),
            &juri,
            Some((JURI_BY_NAME, &juri.name)),
            None,
        )
    }

    fn delete_jurisdiction(&mut self, id: &JurisdictionId) -> Result<(), RegistryError> {
        let Some(juri): Option<Jurisdiction> = self.read_row(JURISDICTIONS, id.as_str())? else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        for vocab in self.vocabularies_in(id)? {
            self.delete_vocabulary(&vocab.id)?;
        }
        for rel in self.term_relations_in(id)? {
            self.delete_term_relation(&rel.id)?;
        }
        for doc in self.documents_in(id)? {
            self.delete_document(&doc.id)?;
        }
        for cw in self.crosswalks_in(id)? {
            self.delete_crosswalk(&cw.id)?;
        }
        for coll in self.collections_in(id)? {
            self.delete_collection(&coll.id)?;
        }
        for corr in self.correlations_in(id)? {
            self.delete_correlation(&corr.id)?;
        }
        self.del_row(
            JURISDICTIONS,
            id.as_str(),
            Some((JURI_BY_NAME, &juri.name)),
            None,
        )?;
        Ok(())
    }

    // -- vocabularies ---------------------------------------------------------

    fn insert_vocabulary(&mut self, vocab: ControlledVocabulary) -> Result<(), RegistryError> {
        let key = (vocab.jurisdiction.as_str(), vocab.name.as_str());
        if self.index2_get(VOCAB_BY_KEY, key)?.is_some() {
            return Err(RegistryError::Conflict(format!(
                "vocabulary {:?} already exists in jurisdiction {}",
                vocab.name, vocab.jurisdiction
            )));
        }
        self.put_row(
            VOCABULARIES,
            vocab.id.as_str(),
            &vocab,
            None,
            Some((VOCAB_BY_KEY, key)),
        )
    }

    fn vocabulary(
        &self,
        id: &VocabularyId,
    ) -> Result<Option<ControlledVocabulary>, RegistryError> {
        self.read_row(VOCABULARIES, id.as_str())
    }

    fn vocabulary_by_key(
        &self,
        jurisdiction: &JurisdictionId,
        name: &str,
    ) -> Result<Option<ControlledVocabulary>, RegistryError> {
        match self.index2_get(VOCAB_BY_KEY, (jurisdiction.as_str(), name))? {
            Some(id) => self.read_row(VOCABULARIES, &id),
            None => Ok(None),
        }
    }

    fn vocabularies_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ControlledVocabulary>, RegistryError> {
        let rows: Vec<ControlledVocabulary> = self.scan_rows(VOCABULARIES)?;
        Ok(rows
            .into_iter()
            .filter(|v| v.jurisdiction == *jurisdiction)
            .collect())
    }

    fn update_vocabulary(&mut self, vocab: ControlledVocabulary) -> Result<(), RegistryError> {
        let Some(existing): Option<ControlledVocabulary> =
            self.read_row(VOCABULARIES, vocab.id.as_str())?
        else {
            return Err(RegistryError::NotFound(vocab.id.0));
        };
        let key_changed =
            existing.jurisdiction != vocab.jurisdiction || existing.name != vocab.name;
        if key_changed {
            let new_key = (vocab.jurisdiction.as_str(), vocab.name.as_str());
            if self.index2_get(VOCAB_BY_KEY, new_key)?.is_some() {
                return Err(RegistryError::Conflict(format!(
                    "vocabulary {:?} already exists in jurisdiction {}",
                    vocab.name, vocab.jurisdiction
                )));
            }
            self.del_row(
                VOCABULARIES,
                vocab.id.as_str(),
                None,
                Some((
                    VOCAB_BY_KEY,
                    (existing.jurisdiction.as_str(), existing.name.as_str()),
                )),
            )?;
        }
        self.put_row(
            VOCABULARIES,
            vocab.id.as_str(),
            &vocab,
            None,
            Some((VOCAB_BY_KEY, (vocab.jurisdiction.as_str(), vocab.name.as_str()))),
        )
    }

    fn delete_vocabulary(&mut self, id: &VocabularyId) -> Result<(), RegistryError> {
        let Some(vocab): Option<ControlledVocabulary> = self.read_row(VOCABULARIES, id.as_str())?
        else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        for term in self.terms_in(id)? {
            self.delete_term(&term.id)?;
        }
        self.del_row(
            VOCABULARIES,
            id.as_str(),
            None,
            Some((VOCAB_BY_KEY, (vocab.jurisdiction.as_str(), vocab.name.as_str()))),
        )?;
        Ok(())
    }

    // -- terms ----------------------------------------------------------------

    fn insert_term(&mut self, term: Term) -> Result<(), RegistryError> {
        let key = (term.vocabulary.as_str(), term.path.as_str());
        if self.index2_get(TERM_BY_PATH, key)?.is_some() {
            return Err(RegistryError::Conflict(format!(
                "term path {:?} already exists in vocabulary {}",
                term.path, term.vocabulary
            )));
        }
        self.put_row(
            TERMS,
            term.id.as_str(),
            &term,
            None,
            Some((TERM_BY_PATH, key)),
        )
    }

    fn term(&self, id: &TermId) -> Result<Option<Term>, RegistryError> {
        self.read_row(TERMS, id.as_str())
    }

    fn term_by_path(
        &self,
        vocabulary: &VocabularyId,
        path: &str,
    ) -> Result<Option<Term>, RegistryError> {
        match self.index2_get(TERM_BY_PATH, (vocabulary.as_str(), path))? {
            Some(id) => self.read_row(TERMS, &id),
            None => Ok(None),
        }
    }

    fn terms_in(&self, vocabulary: &VocabularyId) -> Result<Vec<Term>, RegistryError> {
        let rows: Vec<Term> = self.scan_rows(TERMS)?;
        let mut rows: Vec<Term> = rows
            .into_iter()
            .filter(|t| t.vocabulary == *vocabulary)
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
        let Some(existing): Option<Term> = self.read_row(TERMS, term.id.as_str())? else {
            return Err(RegistryError::NotFound(term.id.0));
        };
        let key_changed = existing.vocabulary != term.vocabulary || existing.path != term.path;
        if key_changed {
            let new_key = (term.vocabulary.as_str(), term.path.as_str());
            if self.index2_get(TERM_BY_PATH, new_key)?.is_some() {
                return Err(RegistryError::Conflict(format!(
                    "term path {:?} already exists in vocabulary {}",
                    term.path, term.vocabulary
                )));
            }
            self.del_row(
                TERMS,
                term.id.as_str(),
                None,
                Some((
                    TERM_BY_PATH,
                    (existing.vocabulary.as_str(), existing.path.as_str()),
                )),
            )?;
        }
        self.put_row(
            TERMS,
            term.id.as_str(),
            &term,
            None,
            Some((TERM_BY_PATH, (term.vocabulary.as_str(), term.path.as_str()))),
        )
    }

    fn delete_term(&mut self, id: &TermId) -> Result<(), RegistryError> {
        let Some(term): Option<Term> = self.read_row(TERMS, id.as_str())? else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        // Cascade relation edges referencing this term.
        let relations: Vec<TermRelation> = self.scan_rows(TERM_RELATIONS)?;
        for rel in relations {
            if rel.source == *id || rel.target.as_ref() == Some(id) {
                self.del_row(TERM_RELATIONS, rel.id.as_str(), None, None)?;
            }
        }
        // Null out weak kind references (SET NULL semantics).
        let nodes: Vec<StandardNode> = self.scan_rows(STANDARD_NODES)?;
        for mut node in nodes {
            if node.kind.as_ref() == Some(id) {
                node.kind = None;
                self.put_row(STANDARD_NODES, node.id.as_str(), &node, None, None)?;
            }
        }
        let node_rels: Vec<StandardNodeRelation> = self.scan_rows(STANDARD_NODE_RELATIONS)?;
        for mut rel in node_rels {
            if rel.kind.as_ref() == Some(id) {
                rel.kind = None;
                self.put_row(STANDARD_NODE_RELATIONS, rel.id.as_str(), &rel, None, None)?;
            }
        }
        let content_rels: Vec<ContentStandardRelation> =
            self.scan_rows(CONTENT_STANDARD_RELATIONS)?;
        for mut rel in content_rels {
            if rel.kind.as_ref() == Some(id) {
                rel.kind = None;
                self.put_row(CONTENT_STANDARD_RELATIONS, rel.id.as_str(), &rel, None, None)?;
            }
        }
        self.del_row(
            TERMS,
            id.as_str(),
            None,
            Some((TERM_BY_PATH, (term.vocabulary.as_str(), term.path.as_str()))),
        )?;
        Ok(())
    }

    // -- term relations -------------------------------------------------------

    fn insert_term_relation(&mut self, rel: TermRelation) -> Result<(), RegistryError> {
        self.put_row(TERM_RELATIONS, rel.id.as_str(), &rel, None, None)
    }

    fn term_relation(
        &self,
        id: &TermRelationId,
    ) -> Result<Option<TermRelation>, RegistryError> {
        self.read_row(TERM_RELATIONS, id.as_str())
    }

    fn term_relations_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<TermRelation>, RegistryError> {
        let rows: Vec<TermRelation> = self.scan_rows(TERM_RELATIONS)?;
        Ok(rows
            .into_iter()
            .filter(|r| r.jurisdiction == *jurisdiction)
            .collect())
    }

    fn delete_term_relation(&mut self, id: &TermRelationId) -> Result<(), RegistryError> {
        if self.del_row(TERM_RELATIONS, id.as_str(), None, None)? {
            Ok(())
        } else {
            Err(RegistryError::NotFound(id.0.clone()))
        }
    }

    // -- documents ------------------------------------------------------------

    fn insert_document(&mut self, doc: StandardsDocument) -> Result<(), RegistryError> {
        if self.index1_get(DOC_BY_NAME, &doc.name)?.is_some() {
            return Err(RegistryError::Conflict(format!(
                "document name {:?} already exists",
                doc.name
            )));
        }
        self.put_row(
            DOCUMENTS,
            doc.id.as_str(),
            &doc,
            Some((DOC_BY_NAME, &doc.name)),
            None,
        )
    }

    fn document(&self, id: &DocumentId) -> Result<Option<StandardsDocument>, RegistryError> {
        self.read_row(DOCUMENTS, id.as_str())
    }

    fn document_by_name(&self, name: &str) -> Result<Option<StandardsDocument>, RegistryError> {
        match self.index1_get(DOC_BY_NAME, name)? {
            Some(id) => self.read_row(DOCUMENTS, &id),
            None => Ok(None),
        }
    }

    fn documents_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<StandardsDocument>, RegistryError> {
        let rows: Vec<StandardsDocument> = self.scan_rows(DOCUMENTS)?;
        Ok(rows
            .into_iter()
            .filter(|d| d.jurisdiction == *jurisdiction)
            .collect())
    }

    fn delete_document(&mut self, id: &DocumentId) -> Result<(), RegistryError> {
        let Some(doc): Option<StandardsDocument> = self.read_row(DOCUMENTS, id.as_str())? else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        let nodes = self.standard_nodes_in(id)?;
        let node_ids: Vec<StandardNodeId> = nodes.iter().map(|n| n.id.clone()).collect();
        let relations: Vec<StandardNodeRelation> = self.scan_rows(STANDARD_NODE_RELATIONS)?;
        for rel in relations {
            if node_ids.contains(&rel.source) || node_ids.contains(&rel.target) {
                self.del_row(STANDARD_NODE_RELATIONS, rel.id.as_str(), None, None)?;
            }
        }
        let content_rels: Vec<ContentStandardRelation> =
            self.scan_rows(CONTENT_STANDARD_RELATIONS)?;
        for rel in content_rels {
            if node_ids.contains(&rel.target) {
                self.del_row(CONTENT_STANDARD_RELATIONS, rel.id.as_str(), None, None)?;
            }
        }
        for node in &nodes {
            let root_index = node
                .is_root()
                .then_some((DOC_ROOT, node.document.as_str()));
            self.del_row(STANDARD_NODES, node.id.as_str(), root_index, None)?;
        }
        self.del_row(DOCUMENTS, id.as_str(), Some((DOC_BY_NAME, &doc.name)), None)?;
        Ok(())
    }

    // -- standard nodes -------------------------------------------------------

    fn insert_standard_node(&mut self, node: StandardNode) -> Result<(), RegistryError> {
        let root_index = if node.is_root() {
            if self.index1_get(DOC_ROOT, node.document.as_str())?.is_some() {
                return Err(RegistryError::DuplicateRoot(node.document.0));
            }
            Some((DOC_ROOT, node.document.as_str()))
        } else {
            None
        };
        self.put_row(STANDARD_NODES, node.id.as_str(), &node, root_index, None)
    }

    fn standard_node(
        &self,
        id: &StandardNodeId,
    ) -> Result<Option<StandardNode>, RegistryError> {
        self.read_row(STANDARD_NODES, id.as_str())
    }

    fn document_root(
        &self,
        document: &DocumentId,
    ) -> Result<Option<StandardNode>, RegistryError> {
        match self.index1_get(DOC_ROOT, document.as_str())? {
            Some(id) => self.read_row(STANDARD_NODES, &id),
            None => Ok(None),
        }
    }

    fn standard_children(
        &self,
        parent: &StandardNodeId,
    ) -> Result<Vec<StandardNode>, RegistryError> {
        let rows: Vec<StandardNode> = self.scan_rows(STANDARD_NODES)?;
        let mut rows: Vec<StandardNode> = rows
            .into_iter()
            .filter(|n| n.parent.as_ref() == Some(parent))
            .collect();
        rows.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
        Ok(rows)
    }

    fn standard_nodes_in(
        &self,
        document: &DocumentId,
    ) -> Result<Vec<StandardNode>, RegistryError> {
        let rows: Vec<StandardNode> = self.scan_rows(STANDARD_NODES)?;
        Ok(rows
            .into_iter()
            .filter(|n| n.document == *document)
            .collect())
    }

    fn delete_standard_node(&mut self, id: &StandardNodeId) -> Result<(), RegistryError> {
        let Some(node): Option<StandardNode> = self.read_row(STANDARD_NODES, id.as_str())? else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        let relations: Vec<StandardNodeRelation> = self.scan_rows(STANDARD_NODE_RELATIONS)?;
        for rel in relations {
            if rel.source == *id || rel.target == *id {
                self.del_row(STANDARD_NODE_RELATIONS, rel.id.as_str(), None, None)?;
            }
        }
        let content_rels: Vec<ContentStandardRelation> =
            self.scan_rows(CONTENT_STANDARD_RELATIONS)?;
        for rel in content_rels {
            if rel.target == *id {
                self.del_row(CONTENT_STANDARD_RELATIONS, rel.id.as_str(), None, None)?;
            }
        }
        let root_index = node
            .is_root()
            .then_some((DOC_ROOT, node.document.as_str()));
        self.del_row(STANDARD_NODES, id.as_str(), root_index, None)?;
        Ok(())
    }

    // -- crosswalks and node relations ----------------------------------------

    fn insert_crosswalk(&mut self, cw: StandardsCrosswalk) -> Result<(), RegistryError> {
        self.put_row(CROSSWALKS, cw.id.as_str(), &cw, None, None)
    }

    fn crosswalk(&self, id: &CrosswalkId) -> Result<Option<StandardsCrosswalk>, RegistryError> {
        self.read_row(CROSSWALKS, id.as_str())
    }

    fn crosswalks_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<StandardsCrosswalk>, RegistryError> {
        let rows: Vec<StandardsCrosswalk> = self.scan_rows(CROSSWALKS)?;
        Ok(rows
            .into_iter()
            .filter(|c| c.jurisdiction == *jurisdiction)
            .collect())
    }

    fn delete_crosswalk(&mut self, id: &CrosswalkId) -> Result<(), RegistryError> {
        for rel in self.standard_node_relations_in(id)? {
            self.del_row(STANDARD_NODE_RELATIONS, rel.id.as_str(), None, None)?;
        }
        if self.del_row(CROSSWALKS, id.as_str(), None, None)? {
            Ok(())
        } else {
            Err(RegistryError::NotFound(id.0.clone()))
        }
    }

    fn insert_standard_node_relation(
        &mut self,
        rel: StandardNodeRelation,
    ) -> Result<(), RegistryError> {
        self.put_row(
            STANDARD_NODE_RELATIONS,
            rel.id.as_str(),
            &rel,
            None,
            None,
        )
    }

    fn standard_node_relation(
        &self,
        id: &StandardNodeRelationId,
    ) -> Result<Option<StandardNodeRelation>, RegistryError> {
        self.read_row(STANDARD_NODE_RELATIONS, id.as_str())
    }

    fn standard_node_relations_in(
        &self,
        crosswalk: &CrosswalkId,
    ) -> Result<Vec<StandardNodeRelation>, RegistryError> {
        let rows: Vec<StandardNodeRelation> = self.scan_rows(STANDARD_NODE_RELATIONS)?;
        Ok(rows
            .into_iter()
            .filter(|r| r.crosswalk == *crosswalk)
            .collect())
    }

    fn delete_standard_node_relation(
        &mut self,
        id: &StandardNodeRelationId,
    ) -> Result<(), RegistryError> {
        if self.del_row(STANDARD_NODE_RELATIONS, id.as_str(), None, None)? {
            Ok(())
        } else {
            Err(RegistryError::NotFound(id.0.clone()))
        }
    }

    // -- collections and content nodes ----------------------------------------

    fn insert_collection(&mut self, coll: ContentCollection) -> Result<(), RegistryError> {
        self.put_row(COLLECTIONS, coll.id.as_str(), &coll, None, None)
    }

    fn collection(&self, id: &CollectionId) -> Result<Option<ContentCollection>, RegistryError> {
        self.read_row(COLLECTIONS, id.as_str())
    }

    fn collections_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ContentCollection>, RegistryError> {
        let rows: Vec<ContentCollection> = self.scan_rows(COLLECTIONS)?;
        Ok(rows
            .into_iter()
            .filter(|c| c.jurisdiction == *jurisdiction)
            .collect())
    }

    fn delete_collection(&mut self, id: &CollectionId) -> Result<(), RegistryError> {
        let nodes = self.content_nodes_in(id)?;
        let node_ids: Vec<ContentNodeId> = nodes.iter().map(|n| n.id.clone()).collect();
        let relations: Vec<ContentStandardRelation> =
            self.scan_rows(CONTENT_STANDARD_RELATIONS)?;
        for rel in relations {
            if node_ids.contains(&rel.source) {
                self.del_row(CONTENT_STANDARD_RELATIONS, rel.id.as_str(), None, None)?;
            }
        }
        for node in &nodes {
            let root_index = node
                .is_root()
                .then_some((COLL_ROOT, node.collection.as_str()));
            self.del_row(CONTENT_NODES, node.id.as_str(), root_index, None)?;
        }
        if self.del_row(COLLECTIONS, id.as_str(), None, None)? {
            Ok(())
        } else {
            Err(RegistryError::NotFound(id.0.clone()))
        }
    }

    fn insert_content_node(&mut self, node: ContentNode) -> Result<(), RegistryError> {
        let root_index = if node.is_root() {
            if self
                .index1_get(COLL_ROOT, node.collection.as_str())?
                .is_some()
            {
                return Err(RegistryError::DuplicateRoot(node.collection.0));
            }
            Some((COLL_ROOT, node.collection.as_str()))
        } else {
            None
        };
        self.put_row(CONTENT_NODES, node.id.as_str(), &node, root_index, None)
    }

    fn content_node(&self, id: &ContentNodeId) -> Result<Option<ContentNode>, RegistryError> {
        self.read_row(CONTENT_NODES, id.as_str())
    }

    fn collection_root(
        &self,
        collection: &CollectionId,
    ) -> Result<Option<ContentNode>, RegistryError> {
        match self.index1_get(COLL_ROOT, collection.as_str())? {
            Some(id) => self.read_row(CONTENT_NODES, &id),
            None => Ok(None),
        }
    }

    fn content_children(
        &self,
        parent: &ContentNodeId,
    ) -> Result<Vec<ContentNode>, RegistryError> {
        let rows: Vec<ContentNode> = self.scan_rows(CONTENT_NODES)?;
        let mut rows: Vec<ContentNode> = rows
            .into_iter()
            .filter(|n| n.parent.as_ref() == Some(parent))
            .collect();
        rows.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
        Ok(rows)
    }

    fn content_nodes_in(
        &self,
        collection: &CollectionId,
    ) -> Result<Vec<ContentNode>, RegistryError> {
        let rows: Vec<ContentNode> = self.scan_rows(CONTENT_NODES)?;
        Ok(rows
            .into_iter()
            .filter(|n| n.collection == *collection)
            .collect())
    }

    fn delete_content_node(&mut self, id: &ContentNodeId) -> Result<(), RegistryError> {
        let Some(node): Option<ContentNode> = self.read_row(CONTENT_NODES, id.as_str())? else {
            return Err(RegistryError::NotFound(id.0.clone()));
        };
        let relations: Vec<ContentStandardRelation> =
            self.scan_rows(CONTENT_STANDARD_RELATIONS)?;
        for rel in relations {
            if rel.source == *id {
                self.del_row(CONTENT_STANDARD_RELATIONS, rel.id.as_str(), None, None)?;
            }
        }
        let root_index = node
            .is_root()
            .then_some((COLL_ROOT, node.collection.as_str()));
        self.del_row(CONTENT_NODES, id.as_str(), root_index, None)?;
        Ok(())
    }

    // -- correlations and content-standard relations --------------------------

    fn insert_correlation(&mut self, corr: ContentCorrelation) -> Result<(), RegistryError> {
        self.put_row(CORRELATIONS, corr.id.as_str(), &corr, None, None)
    }

    fn correlation(
        &self,
        id: &CorrelationId,
    ) -> Result<Option<ContentCorrelation>, RegistryError> {
        self.read_row(CORRELATIONS, id.as_str())
    }

    fn correlations_in(
        &self,
        jurisdiction: &JurisdictionId,
    ) -> Result<Vec<ContentCorrelation>, RegistryError> {
        let rows: Vec<ContentCorrelation> = self.scan_rows(CORRELATIONS)?;
        Ok(rows
            .into_iter()
            .filter(|c| c.jurisdiction == *jurisdiction)
            .collect())
    }

    fn delete_correlation(&mut self, id: &CorrelationId) -> Result<(), RegistryError> {
        for rel in self.content_standard_relations_in(id)? {
            self.del_row(CONTENT_STANDARD_RELATIONS, rel.id.as_str(), None, None)?;
        }
        if self.del_row(CORRELATIONS, id.as_str(), None, None)? {
            Ok(())
        } else {
            Err(RegistryError::NotFound(id.0.clone()))
        }
    }

    fn insert_content_standard_relation(
        &mut self,
        rel: ContentStandardRelation,
    ) -> Result<(), RegistryError> {
        self.put_row(
            CONTENT_STANDARD_RELATIONS,
            rel.id.as_str(),
            &rel,
            None,
            None,
        )
    }

    fn content_standard_relation(
        &self,
        id: &ContentStandardRelationId,
    ) -> Result<Option<ContentStandardRelation>, RegistryError> {
        self.read_row(CONTENT_STANDARD_RELATIONS, id.as_str())
    }

    fn content_standard_relations_in(
        &self,
        correlation: &CorrelationId,
    ) -> Result<Vec<ContentStandardRelation>, RegistryError> {
        let rows: Vec<ContentStandardRelation> =
            self.scan_rows(CONTENT_STANDARD_RELATIONS)?;
        Ok(rows
            .into_iter()
            .filter(|r| r.correlation == *correlation)
            .collect())
    }

    fn delete_content_standard_relation(
        &mut self,
        id: &ContentStandardRelationId,
    ) -> Result<(), RegistryError> {
        if self.del_row(CONTENT_STANDARD_RELATIONS, id.as_str(), None, None)? {
            Ok(())
        } else {
            Err(RegistryError::NotFound(id.0.clone()))
        }
    }

    // -- metrics --------------------------------------------------------------

    fn counts(&self) -> Result<RegistryCounts, RegistryError> {
        Ok(RegistryCounts {
            jurisdictions: self.row_count(JURISDICTIONS)?,
            vocabularies: self.row_count(VOCABULARIES)?,
            terms: self.row_count(TERMS)?,
            term_relations: self.row_count(TERM_RELATIONS)?,
            documents: self.row_count(DOCUMENTS)?,
            standard_nodes: self.row_count(STANDARD_NODES)?,
            crosswalks: self.row_count(CROSSWALKS)?,
            standard_node_relations: self.row_count(STANDARD_NODE_RELATIONS)?,
            collections: self.row_count(COLLECTIONS)?,
            content_nodes: self.row_count(CONTENT_NODES)?,
            correlations: self.row_count(CORRELATIONS)?,
            content_standard_relations: self.row_count(CONTENT_STANDARD_RELATIONS)?,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, RedbStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RedbStore::open(dir.path().join("registry.redb")).expect("open");
        (dir, store)
    }

    #[test]
    fn rows_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("registry.redb");
        {
            let mut store = RedbStore::open(&db_path).expect("open");
            store
                .insert_jurisdiction(Jurisdiction {
                    id: JurisdictionId::from_string("Jghana123"),
                    name: "Ghana".to_string(),
                    display_name: "Ghana NaCCA".to_string(),
                    ..Jurisdiction::default()
                })
                .expect("insert");
        }
        let store = RedbStore::open(&db_path).expect("reopen");
        let juri = store
            .jurisdiction_by_name("Ghana")
            .expect("read")
            .expect("present");
        assert_eq!(juri.id.as_str(), "Jghana123");
    }

    // Row encoding is not self-describing, so absent optional fields must
    // occupy their slot in the encoded row rather than being skipped.
    #[test]
    fn absent_optional_fields_round_trip() {
        let (_dir, mut store) = temp_store();
        let juri = Jurisdiction {
            id: JurisdictionId::from_string("Jghana123"),
            name: "Ghana".to_string(),
            display_name: "Ghana NaCCA".to_string(),
            country: Some("GH".to_string()),
            ..Jurisdiction::default()
        };
        store.insert_jurisdiction(juri.clone()).expect("insert");
        let read = store
            .jurisdiction(&juri.id)
            .expect("read")
            .expect("present");
        assert_eq!(read, juri);
        assert_eq!(read.language, None);
    }

    #[test]
    fn name_index_enforces_uniqueness() {
        let (_dir, mut store) = temp_store();
        store
            .insert_jurisdiction(Jurisdiction {
                id: JurisdictionId::from_string("J1"),
                name: "Ghana".to_string(),
                display_name: "Ghana".to_string(),
                ..Jurisdiction::default()
            })
            .expect("insert");
        let err = store.insert_jurisdiction(Jurisdiction {
            id: JurisdictionId::from_string("J2"),
            name: "Ghana".to_string(),
            display_name: "Ghana again".to_string(),
            ..Jurisdiction::default()
        });
        assert!(matches!(err, Err(RegistryError::Conflict(_))));
    }

    #[test]
    fn root_index_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("registry.redb");
        {
            let mut store = RedbStore::open(&db_path).expect("open");
            store
                .insert_standard_node(StandardNode {
                    id: StandardNodeId::from_string("S1"),
                    document: DocumentId::from_string("D1"),
                    description: "root".to_string(),
                    ..StandardNode::default()
                })
                .expect("insert");
        }
        let mut store = RedbStore::open(&db_path).expect("reopen");
        let err = store.insert_standard_node(StandardNode {
            id: StandardNodeId::from_string("S2"),
            document: DocumentId::from_string("D1"),
            description: "another root".to_string(),
            ..StandardNode::default()
        });
        assert!(matches!(err, Err(RegistryError::DuplicateRoot(_))));
        // Freeing the slot lets a new root in.
        store
            .delete_standard_node(&StandardNodeId::from_string("S1"))
            .expect("delete");
        store
            .insert_standard_node(StandardNode {
                id: StandardNodeId::from_string("S3"),
                document: DocumentId::from_string("D1"),
                description: "replacement root".to_string(),
                ..StandardNode::default()
            })
            .expect("insert");
    }

    #[test]
    fn term_path_index_round_trips() {
        let (_dir, mut store) = temp_store();
        store
            .insert_term(Term {
                id: TermId::from_string("T1"),
                vocabulary: VocabularyId::from_string("V1"),
                path: "B2/2".to_string(),
                label: "Basic 2, Term 2".to_string(),
                ..Term::default()
            })
            .expect("insert");
        let term = store
            .term_by_path(&VocabularyId::from_string("V1"), "B2/2")
            .expect("read")
            .expect("present");
        assert_eq!(term.id.as_str(), "T1");
        assert!(
            store
                .term_by_path(&VocabularyId::from_string("V2"), "B2/2")
                .expect("read")
                .is_none()
        );
    }
}
