//! Curriculum standards: documents, their node trees, and crosswalks
//! between the trees of different documents.
//!
//! Standard nodes form a true parent-pointer hierarchy scoped to one
//! document. The storage layer guarantees at most one root (depth 0) node
//! per document; see `TreeIntegrityGuard` for the attach/detach rules.

use crate::types::{
    CrosswalkId, DocumentId, JurisdictionId, StandardNodeId, StandardNodeRelationId, TermId,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// PUBLICATION STATUS
// =============================================================================

/// Lifecycle status shared by documents, crosswalks, collections, and
/// correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    #[default]
    PublicDraft,
    Published,
    Retired,
}

// =============================================================================
// STANDARDS DOCUMENT
// =============================================================================

/// A standards document identified by a unique `name`, containing a
/// hierarchy of [`StandardNode`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StandardsDocument {
    pub id: DocumentId,
    /// A short, unique name for the document, e.g. `CCSSM`.
    pub name: String,
    pub jurisdiction: JurisdictionId,
    /// The full title of the document.
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    /// Document version or edition.
    pub version: Option<String>,
    pub publication_status: PublicationStatus,
    /// Where the data of this document was imported from.
    pub source_doc: Option<String>,
    pub canonical_uri: Option<String>,
    pub notes: Option<String>,
}

impl StandardsDocument {
    /// Canonical URI: `/{juri}/documents/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/documents/{}", jurisdiction_name, self.id)
    }
}

// =============================================================================
// STANDARD NODE
// =============================================================================

/// An individual standard entry within a standards document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StandardNode {
    pub id: StandardNodeId,
    pub document: DocumentId,
    /// Parent node. `None` for the document's single root.
    pub parent: Option<StandardNodeId>,
    /// Distance from the root; the root has depth 0.
    pub depth: u32,
    /// Element kind, drawn from a `curriculum_elements` vocabulary.
    pub kind: Option<TermId>,
    /// Position among siblings. Fractional values allow insertion between
    /// existing siblings without renumbering.
    pub sort_order: f64,
    /// A human-referenceable code for this node, e.g. `B2.1.2.1`.
    pub notation: Option<String>,
    /// A character or symbol denoting the node position within a list.
    pub list_id: Option<String>,
    /// An optional heading or abbreviated description.
    pub title: Option<String>,
    /// Primary text that describes this node.
    pub description: String,
    pub language: Option<String>,
    pub notes: Option<String>,
}

impl StandardNode {
    /// Canonical URI: `/{juri}/standardnodes/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/standardnodes/{}", jurisdiction_name, self.id)
    }

    /// True when this node is its document's root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// =============================================================================
// CROSSWALK
// =============================================================================

/// A named set of [`StandardNodeRelation`]s describing a mapping between
/// source curriculum nodes and target curriculum nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StandardsCrosswalk {
    pub id: CrosswalkId,
    pub jurisdiction: JurisdictionId,
    /// The publicly visible title for this crosswalk.
    pub title: String,
    pub description: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
    pub publication_status: PublicationStatus,
}

impl StandardsCrosswalk {
    /// Canonical URI: `/{juri}/standardscrosswalks/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/standardscrosswalks/{}", jurisdiction_name, self.id)
    }
}

/// A typed relation between two [`StandardNode`]s, owned by a crosswalk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StandardNodeRelation {
    pub id: StandardNodeRelationId,
    pub crosswalk: CrosswalkId,
    pub source: StandardNodeId,
    pub target: StandardNodeId,
    /// Edge kind, drawn from a restricted vocabulary.
    pub kind: Option<TermId>,
    pub notes: Option<String>,
}

impl StandardNodeRelation {
    /// Canonical URI: `/{juri}/standardnoderels/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/standardnoderels/{}", jurisdiction_name, self.id)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_status_wire_names() {
        let json = serde_json::to_string(&PublicationStatus::PublicDraft).expect("serialize");
        assert_eq!(json, "\"publicdraft\"");
        assert_eq!(PublicationStatus::default(), PublicationStatus::PublicDraft);
    }

    #[test]
    fn root_detection() {
        let node = StandardNode::default();
        assert!(node.is_root());
        let child = StandardNode {
            parent: Some(StandardNodeId::from_string("Sparent12")),
            depth: 1,
            ..StandardNode::default()
        };
        assert!(!child.is_root());
    }

    #[test]
    fn scoped_uris_use_resource_plurals() {
        let doc = StandardsDocument {
            id: DocumentId::from_string("Dabcdefgh"),
            ..StandardsDocument::default()
        };
        assert_eq!(doc.uri_in("Ghana"), "/Ghana/documents/Dabcdefgh");
    }
}
