//! # standreg-core
//!
//! The domain core of the standreg metadata registry - THE LOGIC.
//!
//! This crate implements a multi-tenant registry of curriculum standards
//! and learning-content metadata: jurisdictions own controlled
//! vocabularies, standards documents, crosswalks, content collections,
//! and correlations, and every entity is addressable by a canonical
//! hierarchical URI.
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network dependencies
//! - The core raises typed errors ([`RegistryError`]); HTTP mapping lives
//!   in the application layer
//! - All tree mutation goes through the tree guard so structural
//!   invariants (single root, depth, sibling order) hold everywhere

// =============================================================================
// MODULES
// =============================================================================

pub mod hyperlink;
pub mod ingest;
pub mod model;
pub mod path;
pub mod registry;
pub mod resolve;
pub mod storage;
pub mod store;
pub mod tree;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    CollectionId, ContentNodeId, ContentStandardRelationId, CorrelationId, CrosswalkId,
    DocumentId, JurisdictionId, RegistryError, StandardNodeId, StandardNodeRelationId, TermId,
    TermRelationId, VocabularyId,
};

// =============================================================================
// RE-EXPORTS: Data Model
// =============================================================================

pub use model::{
    ContentCollection, ContentCorrelation, ContentNode, ContentStandardRelation,
    ControlledVocabulary, Jurisdiction, PublicationStatus, StandardNode, StandardNodeRelation,
    StandardsCrosswalk, StandardsDocument, Term, TermRelation, TermRelationKind, VocabularyKind,
};

// =============================================================================
// RE-EXPORTS: Registry Engine
// =============================================================================

pub use hyperlink::{EntityKind, Hyperlink, HyperlinkField, HyperlinkRegistry, LinkAccessor};
pub use ingest::{
    CollectionImport, ContentNodeRecord, DocumentImport, ImportOptions, ImportReport,
    NewJurisdiction, NodeRecord, TermRecord, VocabularyImport, VocabularyLookup,
};
pub use registry::{
    NewContentNode, NewContentStandardRelation, NewCorrelation, NewCrosswalk, NewStandardNode,
    NewStandardNodeRelation, NewTermRelation, Registry, StorageBackend,
};
pub use resolve::{
    Format, ParsedUri, Resolved, ResourceKind, ResourceRef, parse_uri, resolve_uri, uri_of,
};
pub use storage::RedbStore;
pub use store::{MemStore, RegistryCounts, RegistryStore};
pub use tree::{Placement, sort_key_between};
