//! # Domain Model
//!
//! Entity definitions for the registry, grouped by concern:
//! - [`jurisdictions`] — tenant namespaces
//! - [`terms`] — controlled vocabularies, terms, and term relations
//! - [`standards`] — standards documents, node trees, and crosswalks
//! - [`content`] — content collections, node trees, and correlations
//!
//! Entities carry their canonical URI templates (`uri*` methods); the
//! resolver composes these with stored rows so that every produced URI
//! round-trips back to the same entity.

mod content;
mod jurisdictions;
mod standards;
mod terms;

pub use content::{ContentCollection, ContentCorrelation, ContentNode, ContentStandardRelation};
pub use jurisdictions::Jurisdiction;
pub use standards::{
    PublicationStatus, StandardNode, StandardNodeRelation, StandardsCrosswalk, StandardsDocument,
};
pub use terms::{ControlledVocabulary, Term, TermRelation, TermRelationKind, VocabularyKind};
