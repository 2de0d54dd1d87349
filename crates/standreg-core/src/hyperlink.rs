//! # Hyperlink Fields
//!
//! Every entity representation carries hyperlinks to its related entities
//! (a term links to its vocabulary and parent term, a standard node to its
//! document and parent node, and so on). The [`HyperlinkRegistry`] holds
//! one named accessor per link field, keyed by entity kind.
//!
//! Accessors are plain functions and tolerant of absent links anywhere in
//! the chain: an optional field that is `None`, or a referenced row that no
//! longer exists, yields no link rather than an error. Only storage faults
//! propagate.

use crate::resolve::{Resolved, uri_of};
use crate::store::RegistryStore;
use crate::types::RegistryError;
use std::collections::BTreeMap;

// =============================================================================
// ENTITY KINDS
// =============================================================================

/// Discriminant for every addressable entity kind, including the
/// name-addressed ones that [`crate::resolve::ResourceKind`] leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityKind {
    Jurisdiction,
    Vocabulary,
    Term,
    TermRelation,
    Document,
    StandardNode,
    Crosswalk,
    StandardNodeRelation,
    Collection,
    ContentNode,
    Correlation,
    ContentStandardRelation,
}

impl EntityKind {
    /// The kind of a resolved entity.
    #[must_use]
    pub fn of(entity: &Resolved) -> Self {
        match entity {
            Resolved::Jurisdiction(_) => Self::Jurisdiction,
            Resolved::Vocabulary(_) => Self::Vocabulary,
            Resolved::Term(_) => Self::Term,
            Resolved::TermRelation(_) => Self::TermRelation,
            Resolved::Document(_) => Self::Document,
            Resolved::StandardNode(_) => Self::StandardNode,
            Resolved::Crosswalk(_) => Self::Crosswalk,
            Resolved::StandardNodeRelation(_) => Self::StandardNodeRelation,
            Resolved::Collection(_) => Self::Collection,
            Resolved::ContentNode(_) => Self::ContentNode,
            Resolved::Correlation(_) => Self::Correlation,
            Resolved::ContentStandardRelation(_) => Self::ContentStandardRelation,
        }
    }
}

// =============================================================================
// HYPERLINK FIELDS
// =============================================================================

/// A single rendered hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Hyperlink {
    pub field: &'static str,
    pub uri: String,
}

/// An accessor produces the link target URI for one field of one entity, or
/// `None` when any hop in the chain is absent.
pub type LinkAccessor =
    fn(&dyn RegistryStore, &Resolved) -> Result<Option<String>, RegistryError>;

/// A named hyperlink field.
#[derive(Debug, Clone, Copy)]
pub struct HyperlinkField {
    pub name: &'static str,
    pub accessor: LinkAccessor,
}

/// Registry of hyperlink fields per entity kind.
#[derive(Debug, Clone, Default)]
pub struct HyperlinkRegistry {
    fields: BTreeMap<EntityKind, Vec<HyperlinkField>>,
}

impl HyperlinkRegistry {
    /// An empty registry with no fields.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in field set covering every entity kind's ownership and
    /// reference links.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for kind in [
            EntityKind::Vocabulary,
            EntityKind::TermRelation,
            EntityKind::Document,
            EntityKind::Crosswalk,
            EntityKind::Collection,
            EntityKind::Correlation,
        ] {
            registry.register(kind, "jurisdiction", link_jurisdiction);
        }
        registry.register(EntityKind::Document, "root", link_tree_root);
        registry.register(EntityKind::Collection, "root", link_tree_root);
        registry.register(EntityKind::Term, "vocabulary", link_term_vocabulary);
        registry.register(EntityKind::Term, "parent", link_term_parent);
        registry.register(EntityKind::TermRelation, "source", link_relation_source);
        registry.register(EntityKind::TermRelation, "target", link_relation_target);
        registry.register(EntityKind::StandardNode, "document", link_node_document);
        registry.register(EntityKind::StandardNode, "parent", link_node_parent);
        registry.register(EntityKind::StandardNode, "kind", link_node_kind);
        registry.register(
            EntityKind::StandardNodeRelation,
            "crosswalk",
            link_relation_crosswalk,
        );
        registry.register(EntityKind::StandardNodeRelation, "source", link_relation_source);
        registry.register(EntityKind::StandardNodeRelation, "target", link_relation_target);
        registry.register(EntityKind::ContentNode, "collection", link_node_collection);
        registry.register(EntityKind::ContentNode, "parent", link_node_parent);
        registry.register(
            EntityKind::ContentStandardRelation,
            "correlation",
            link_relation_correlation,
        );
        registry.register(
            EntityKind::ContentStandardRelation,
            "source",
            link_relation_source,
        );
        registry.register(
            EntityKind::ContentStandardRelation,
            "target",
            link_relation_target,
        );
        registry
    }

    /// Register a field for a kind. Fields render in registration order.
    pub fn register(&mut self, kind: EntityKind, name: &'static str, accessor: LinkAccessor) {
        self.fields
            .entry(kind)
            .or_default()
            .push(HyperlinkField { name, accessor });
    }

    /// The registered field names for a kind.
    #[must_use]
    pub fn field_names(&self, kind: EntityKind) -> Vec<&'static str> {
        self.fields
            .get(&kind)
            .map(|fields| fields.iter().map(|f| f.name).collect())
            .unwrap_or_default()
    }

    /// Render all present links for an entity. Absent links are skipped.
    pub fn links(
        &self,
        store: &dyn RegistryStore,
        entity: &Resolved,
    ) -> Result<Vec<Hyperlink>, RegistryError> {
        let mut links = Vec::new();
        let Some(fields) = self.fields.get(&EntityKind::of(entity)) else {
            return Ok(links);
        };
        for field in fields {
            if let Some(uri) = (field.accessor)(store, entity)? {
                links.push(Hyperlink {
                    field: field.name,
                    uri,
                });
            }
        }
        Ok(links)
    }
}

// =============================================================================
// BUILT-IN ACCESSORS
// =============================================================================

fn uri_or_none(
    store: &dyn RegistryStore,
    entity: Option<Resolved>,
) -> Result<Option<String>, RegistryError> {
    match entity {
        Some(entity) => Ok(Some(uri_of(store, &entity)?)),
        None => Ok(None),
    }
}

fn link_jurisdiction(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    let jid = match entity {
        Resolved::Vocabulary(v) => &v.jurisdiction,
        Resolved::TermRelation(r) => &r.jurisdiction,
        Resolved::Document(d) => &d.jurisdiction,
        Resolved::Crosswalk(c) => &c.jurisdiction,
        Resolved::Collection(c) => &c.jurisdiction,
        Resolved::Correlation(c) => &c.jurisdiction,
        _ => return Ok(None),
    };
    uri_or_none(store, store.jurisdiction(jid)?.map(Resolved::Jurisdiction))
}

/// The root node of a document or collection tree, once one exists.
fn link_tree_root(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    match entity {
        Resolved::Document(doc) => uri_or_none(
            store,
            store.document_root(&doc.id)?.map(Resolved::StandardNode),
        ),
        Resolved::Collection(coll) => uri_or_none(
            store,
            store.collection_root(&coll.id)?.map(Resolved::ContentNode),
        ),
        _ => Ok(None),
    }
}

fn link_term_vocabulary(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    let Resolved::Term(term) = entity else {
        return Ok(None);
    };
    uri_or_none(
        store,
        store.vocabulary(&term.vocabulary)?.map(Resolved::Vocabulary),
    )
}

fn link_term_parent(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    let Resolved::Term(term) = entity else {
        return Ok(None);
    };
    let Some(parent_path) = term.parent_path() else {
        return Ok(None);
    };
    uri_or_none(
        store,
        store
            .term_by_path(&term.vocabulary, parent_path)?
            .map(Resolved::Term),
    )
}

fn link_node_document(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    let Resolved::StandardNode(node) = entity else {
        return Ok(None);
    };
    uri_or_none(store, store.document(&node.document)?.map(Resolved::Document))
}

fn link_node_collection(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    let Resolved::ContentNode(node) = entity else {
        return Ok(None);
    };
    uri_or_none(
        store,
        store.collection(&node.collection)?.map(Resolved::Collection),
    )
}

fn link_node_parent(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    match entity {
        Resolved::StandardNode(node) => {
            let Some(parent) = &node.parent else {
                return Ok(None);
            };
            uri_or_none(store, store.standard_node(parent)?.map(Resolved::StandardNode))
        }
        Resolved::ContentNode(node) => {
            let Some(parent) = &node.parent else {
                return Ok(None);
            };
            uri_or_none(store, store.content_node(parent)?.map(Resolved::ContentNode))
        }
        _ => Ok(None),
    }
}

fn link_node_kind(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    let Resolved::StandardNode(node) = entity else {
        return Ok(None);
    };
    let Some(kind) = &node.kind else {
        return Ok(None);
    };
    uri_or_none(store, store.term(kind)?.map(Resolved::Term))
}

fn link_relation_crosswalk(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    let Resolved::StandardNodeRelation(rel) = entity else {
        return Ok(None);
    };
    uri_or_none(store, store.crosswalk(&rel.crosswalk)?.map(Resolved::Crosswalk))
}

fn link_relation_correlation(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    let Resolved::ContentStandardRelation(rel) = entity else {
        return Ok(None);
    };
    uri_or_none(
        store,
        store.correlation(&rel.correlation)?.map(Resolved::Correlation),
    )
}

/// The `source` endpoint of any relation kind.
fn link_relation_source(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    match entity {
        Resolved::TermRelation(rel) => {
            uri_or_none(store, store.term(&rel.source)?.map(Resolved::Term))
        }
        Resolved::StandardNodeRelation(rel) => uri_or_none(
            store,
            store.standard_node(&rel.source)?.map(Resolved::StandardNode),
        ),
        Resolved::ContentStandardRelation(rel) => uri_or_none(
            store,
            store.content_node(&rel.source)?.map(Resolved::ContentNode),
        ),
        _ => Ok(None),
    }
}

/// The `target` endpoint of any relation kind. A term relation with an
/// external `target_uri` has no internal target link; the external URI is
/// already a plain data field of the representation.
fn link_relation_target(
    store: &dyn RegistryStore,
    entity: &Resolved,
) -> Result<Option<String>, RegistryError> {
    match entity {
        Resolved::TermRelation(rel) => {
            let Some(target) = &rel.target else {
                return Ok(None);
            };
            uri_or_none(store, store.term(target)?.map(Resolved::Term))
        }
        Resolved::StandardNodeRelation(rel) => uri_or_none(
            store,
            store.standard_node(&rel.target)?.map(Resolved::StandardNode),
        ),
        Resolved::ContentStandardRelation(rel) => uri_or_none(
            store,
            store.standard_node(&rel.target)?.map(Resolved::StandardNode),
        ),
        _ => Ok(None),
    }
}

// =============================================================================
// TESTS
// =============================================================================
