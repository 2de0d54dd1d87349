//! # Core Type Definitions
//!
//! This module contains the shared types for the standreg registry:
//! - Prefixed opaque identifiers for every entity kind
//! - The error taxonomy (`RegistryError`)
//!
//! ## Identifier Scheme
//!
//! Every row is keyed by a randomly-generated, prefixed, fixed-length string
//! (`J...` jurisdiction, `V...` vocabulary, `T...` term, ...). Random ids do
//! not leak row counts and double as human-distinguishable tokens. The
//! alphabet excludes confusable glyphs (`I`, `l`, `1`, `0`, `O`).

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIER ALPHABET
// =============================================================================

/// Alphabet for random id payloads. Excludes confusable symbols and every
/// letter an id prefix starts with, so the leading character always names
/// the kind. Trailing prefix letters (the `X` of `CX`) may recur in a
/// payload; lookups are kind-scoped, so that is harmless.
pub const ID_ALPHABET: &[u8] = b"23456789ABEFGHKLMNPQUWXYZabcdefghijkmnopqrstuvwxyz";

/// Number of random characters appended after the prefix.
pub const ID_PAYLOAD_LENGTH: usize = 8;

fn random_payload<R: Rng>(rng: &mut R) -> String {
    (0..ID_PAYLOAD_LENGTH)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}

// =============================================================================
// ENTITY IDENTIFIERS
// =============================================================================

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// The fixed prefix carried by every id of this kind.
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh random id with the kind prefix.
            pub fn generate<R: Rng>(rng: &mut R) -> Self {
                Self(format!("{}{}", $prefix, random_payload(rng)))
            }

            /// Wrap an existing id string (e.g. read back from storage).
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier for a [`crate::model::Jurisdiction`].
    JurisdictionId, "J");
entity_id!(
    /// Identifier for a [`crate::model::ControlledVocabulary`].
    VocabularyId, "V");
entity_id!(
    /// Identifier for a [`crate::model::Term`].
    TermId, "T");
entity_id!(
    /// Identifier for a [`crate::model::TermRelation`].
    TermRelationId, "TR");
entity_id!(
    /// Identifier for a [`crate::model::StandardsDocument`].
    DocumentId, "D");
entity_id!(
    /// Identifier for a [`crate::model::StandardNode`].
    StandardNodeId, "S");
entity_id!(
    /// Identifier for a [`crate::model::StandardsCrosswalk`].
    CrosswalkId, "SC");
entity_id!(
    /// Identifier for a [`crate::model::StandardNodeRelation`].
    StandardNodeRelationId, "SR");
entity_id!(
    /// Identifier for a [`crate::model::ContentCollection`].
    CollectionId, "CC");
entity_id!(
    /// Identifier for a [`crate::model::ContentNode`].
    ContentNodeId, "C");
entity_id!(
    /// Identifier for a [`crate::model::ContentCorrelation`].
    CorrelationId, "CX");
entity_id!(
    /// Identifier for a [`crate::model::ContentStandardRelation`].
    ContentStandardRelationId, "CS");

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the registry core.
///
/// The core raises typed errors only; mapping to HTTP status codes is the
/// sole responsibility of the application layer. Nothing here is retried
/// automatically: every failure is either a user input error (reported) or
/// an invariant violation (reported, never silently corrected).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A path component is malformed (empty, stray slash, or characters
    /// outside the URL-safe set).
    #[error("Invalid path segment: {0}")]
    InvalidSegment(String),

    /// No entity exists at the resolved coordinates.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An id resolved but its ownership chain does not match the requested
    /// jurisdiction. Surfaced to clients as not-found so that ids cannot be
    /// enumerated across tenants.
    #[error("Cross-tenant reference: {0}")]
    CrossTenantReference(String),

    /// A second root node was attempted under an owner that already has one.
    #[error("Owner {0} already has a root node")]
    DuplicateRoot(String),

    /// A natural-key uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requested representation suffix is outside the allowed set.
    #[error("Unsupported format: {0}")]
    FormatUnsupported(String),

    /// The payload is structurally valid but semantically rejected.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O or storage error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl RegistryError {
    /// True for errors caused by the caller's input rather than the system.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSegment(_)
                | Self::NotFound(_)
                | Self::CrossTenantReference(_)
                | Self::DuplicateRoot(_)
                | Self::Conflict(_)
                | Self::FormatUnsupported(_)
                | Self::Validation(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix_and_length() {
        let mut rng = rand::rng();
        let id = TermId::generate(&mut rng);
        assert!(id.as_str().starts_with('T'));
        assert_eq!(id.as_str().len(), 1 + ID_PAYLOAD_LENGTH);

        let id = CrosswalkId::generate(&mut rng);
        assert!(id.as_str().starts_with("SC"));
        assert_eq!(id.as_str().len(), 2 + ID_PAYLOAD_LENGTH);
    }

    #[test]
    fn alphabet_excludes_confusables() {
        for c in [b'I', b'l', b'1', b'0', b'O'] {
            assert!(!ID_ALPHABET.contains(&c));
        }
    }

    #[test]
    fn user_errors_classified() {
        assert!(RegistryError::NotFound("x".into()).is_user_error());
        assert!(RegistryError::DuplicateRoot("D1".into()).is_user_error());
        assert!(!RegistryError::IoError("disk".into()).is_user_error());
    }
}
