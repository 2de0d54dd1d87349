//! Controlled vocabularies and their terms. A vocabulary closely resembles
//! a skos:ConceptScheme; a term resembles a skos:Concept addressed by a
//! hierarchical `/`-separated path.

use crate::path;
use crate::types::{JurisdictionId, RegistryError, TermId, TermRelationId, VocabularyId};
use serde::{Deserialize, Serialize};

// =============================================================================
// CONTROLLED VOCABULARY
// =============================================================================

/// Special vocabulary kinds that other entities restrict their term
/// references to (e.g. a document's license must come from a
/// `license_kinds` vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyKind {
    /// Local education levels (local grade levels).
    EducationLevels,
    /// Local academic subjects.
    Subjects,
    /// Global topic taxonomy terms.
    TopicTerms,
    /// Curriculum standard elements.
    CurriculumElements,
    /// License kinds.
    LicenseKinds,
}

/// A set of controlled terms served under `/{juri}/terms/{self.name}`.
/// Unique per `(jurisdiction, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ControlledVocabulary {
    pub id: VocabularyId,
    pub jurisdiction: JurisdictionId,
    pub kind: Option<VocabularyKind>,
    /// The name used in URIs. Must be a valid path segment.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    pub description: Option<String>,
    pub language: Option<String>,
    /// Where this vocabulary is defined.
    pub source: Option<String>,
    pub notes: Option<String>,
    /// Person or organization that published this vocabulary.
    pub creator: Option<String>,
}

impl ControlledVocabulary {
    /// Canonical URI: `/{juri}/terms/{name}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/terms/{}", jurisdiction_name, self.name)
    }
}

// =============================================================================
// TERM
// =============================================================================

/// A term within a controlled vocabulary, addressed as
/// `/{juri}/terms/{vocab}/{self.path}`. Paths can be either simple terms or
/// a `/`-separated taxon path. Unique per `(vocabulary, path)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Term {
    pub id: TermId,
    pub vocabulary: VocabularyId,
    /// Term path as it appears in the URI.
    pub path: String,
    /// Human-readable label.
    pub label: String,
    pub alt_label: Option<String>,
    /// Other unique identifier for this term.
    pub notation: Option<String>,
    pub definition: Option<String>,
    pub notes: Option<String>,
    pub language: Option<String>,
    /// External URI this term was imported from.
    pub source_uri: Option<String>,
    /// URI used when publishing.
    pub canonical_uri: Option<String>,
    /// Sort order among siblings. Fractional values allow insertion between
    /// existing siblings without renumbering.
    pub sort_order: f64,
}

impl Term {
    /// Canonical URI: `/{juri}/terms/{vocab}/{path}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str, vocabulary_name: &str) -> String {
        format!(
            "/{}/terms/{}/{}",
            jurisdiction_name, vocabulary_name, self.path
        )
    }

    /// The parent path, or `None` for a top-level term.
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        path::parent_path(&self.path)
    }
}

// =============================================================================
// TERM RELATION
// =============================================================================

/// Relation kinds, following the SKOS semantic and mapping relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TermRelationKind {
    /// Has parent (a broader term). Within-vocabulary.
    Broader,
    /// Has child (a more specific term). Within-vocabulary.
    Narrower,
    /// Has related term (same vocabulary).
    Related,
    /// Matches exactly (100% identity match).
    ExactMatch,
    /// Matches closely (subjective ~80% match).
    CloseMatch,
    /// Source is related to a subset of the target.
    BroadMatch,
    /// Target is related to a subset of the source.
    NarrowMatch,
    /// Source and target are related and of similar size.
    RelatedMatch,
}

/// A directed edge between two terms (`source` and `target`), or between a
/// source term and an external `target_uri`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRelation {
    pub id: TermRelationId,
    pub jurisdiction: JurisdictionId,
    pub source: TermId,
    /// Internal target term. `None` when the target is external.
    pub target: Option<TermId>,
    /// External target URI. `None` when the target is internal.
    pub target_uri: Option<String>,
    pub kind: TermRelationKind,
    pub notes: Option<String>,
}

impl TermRelation {
    /// Canonical URI: `/{juri}/termrels/{id}`.
    #[must_use]
    pub fn uri_in(&self, jurisdiction_name: &str) -> String {
        format!("/{}/termrels/{}", jurisdiction_name, self.id)
    }

    /// A relation must point at exactly one of an internal term or an
    /// external URI.
    pub fn validate(&self) -> Result<(), RegistryError> {
        match (&self.target, &self.target_uri) {
            (Some(_), Some(_)) => Err(RegistryError::Validation(
                "term relation has both target and target_uri".to_string(),
            )),
            (None, None) => Err(RegistryError::Validation(
                "term relation needs either target or target_uri".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(target: Option<TermId>, target_uri: Option<String>) -> TermRelation {
        TermRelation {
            id: TermRelationId::from_string("TRtest1234"),
            jurisdiction: JurisdictionId::from_string("Jtest1234"),
            source: TermId::from_string("Ttest1234"),
            target,
            target_uri,
            kind: TermRelationKind::ExactMatch,
            notes: None,
        }
    }

    #[test]
    fn relation_requires_exactly_one_target() {
        assert!(relation(Some(TermId::from_string("Tother")), None).validate().is_ok());
        assert!(relation(None, Some("https://example.org/x".to_string())).validate().is_ok());
        assert!(relation(None, None).validate().is_err());
        assert!(
            relation(
                Some(TermId::from_string("Tother")),
                Some("https://example.org/x".to_string())
            )
            .validate()
            .is_err()
        );
    }

    // Every field serializes, absent ones as null: storage encodings are
    // not self-describing, so the model never skips fields. The HTTP and
    // CLI boundaries strip the nulls.
    #[test]
    fn external_relation_serializes_a_null_target() {
        let rel = relation(None, Some("https://example.org/grade2".to_string()));
        let json = serde_json::to_value(&rel).expect("serialize");
        assert_eq!(json["target_uri"], "https://example.org/grade2");
        assert!(json["target"].is_null());
    }

    #[test]
    fn relation_kind_uses_skos_names() {
        let json = serde_json::to_string(&TermRelationKind::ExactMatch).expect("serialize");
        assert_eq!(json, "\"exactMatch\"");
        let json = serde_json::to_string(&TermRelationKind::Broader).expect("serialize");
        assert_eq!(json, "\"broader\"");
    }

    #[test]
    fn term_uri_and_parent() {
        let term = Term {
            path: "B2/2".to_string(),
            label: "Basic 2, level 2".to_string(),
            ..Term::default()
        };
        assert_eq!(term.uri_in("Ghana", "GradeLevels"), "/Ghana/terms/GradeLevels/B2/2");
        assert_eq!(term.parent_path(), Some("B2"));
    }
}
