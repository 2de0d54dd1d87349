//! Content collections: external websites, content archives, or
//! repositories of open educational resources, modeled as node trees that
//! mirror the standards hierarchy pattern, plus correlations that align
//! content nodes with standard nodes.

use super::standards::PublicationStatus;
use crate::types::{
    CollectionId, ContentNodeId, ContentStandardRelationId, CorrelationId, JurisdictionId,
    StandardNodeId, TermId,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// CONTENT COLLECTION
// =============================================================================

/// A content collection containing a tree of [`ContentNode`]s. Examples: a
/// website with learning resources, a YouTube channel, a Kolibri content
/// channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentCollection {
    pub id: CollectionId,
    pub jurisdiction: JurisdictionId,
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub publication_status: PublicationStatus,
    /// The domain name of the collection source (e.g. `khanacademy.org`).
    pub source_domain: Option<String>,
    /// The web location for this content collection.
    pub source_url: Option<String>,
    /// The identifier for this collection in the external repository.
    pub collection_id: Option<String>,
    pub version: Option<String>,
}

impl ContentCollection {
    /// Canonical URI: `/{juri}/contentcollections/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/contentcollections/{}", jurisdiction_name, self.id)
    }
}

// =============================================================================
// CONTENT NODE
// =============================================================================

/// An individual content item (learning resource) within a collection.
/// Identified externally by a `source_id` within the collection's
/// `source_domain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentNode {
    pub id: ContentNodeId,
    pub collection: CollectionId,
    /// Parent node. `None` for the collection's single root.
    pub parent: Option<ContentNodeId>,
    /// Distance from the root; the root has depth 0.
    pub depth: u32,
    /// Position among siblings.
    pub sort_order: f64,
    pub title: String,
    pub description: Option<String>,
    /// Resource kind, e.g. `video`, `exercise`, `topic`.
    pub content_kind: Option<String>,
    /// Identifier within the external content repository.
    pub source_id: Option<String>,
    /// Where the content node can be accessed or downloaded from.
    pub source_url: Option<String>,
    pub language: Option<String>,
}

impl ContentNode {
    /// Canonical URI: `/{juri}/contentnodes/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/contentnodes/{}", jurisdiction_name, self.id)
    }

    /// True when this node is its collection's root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// =============================================================================
// CONTENT CORRELATION
// =============================================================================

/// A named set of [`ContentStandardRelation`]s aligning content nodes with
/// standard nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentCorrelation {
    pub id: CorrelationId,
    pub jurisdiction: JurisdictionId,
    pub title: String,
    pub description: Option<String>,
    pub creator: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
    pub publication_status: PublicationStatus,
}

impl ContentCorrelation {
    /// Canonical URI: `/{juri}/contentcorrelations/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/contentcorrelations/{}", jurisdiction_name, self.id)
    }
}

/// A typed relation from a content node to a standard node, owned by a
/// correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentStandardRelation {
    pub id: ContentStandardRelationId,
    pub correlation: CorrelationId,
    pub source: ContentNodeId,
    pub target: StandardNodeId,
    /// Edge kind, drawn from a restricted vocabulary.
    pub kind: Option<TermId>,
    pub notes: Option<String>,
}

impl ContentStandardRelation {
    /// Canonical URI: `/{juri}/contentstandardrels/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/contentstandardrels/{}", jurisdiction_name, self.id)
    }
}
