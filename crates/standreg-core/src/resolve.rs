//! # URI Resolution
//!
//! Bidirectional mapping between canonical URIs and registry entities.
//!
//! Canonical URI shapes:
//!
//! ```text
//! /{jurisdiction}
//! /{jurisdiction}/terms/{vocabulary}
//! /{jurisdiction}/terms/{vocabulary}/{term-path...}     (greedy tail)
//! /{jurisdiction}/{resource-plural}/{id}
//! ```
//!
//! The final segment may carry a representation suffix (`.json`, `.html`).
//! Dots are not valid segment characters, so a dot in the last segment is
//! always a suffix and never path content. The suffix selects a
//! representation of the entity and never changes which entity resolves.
//!
//! Resolution checks the ownership chain of id-addressed entities against
//! the jurisdiction segment. A mismatch raises
//! [`RegistryError::CrossTenantReference`], which the application layer
//! surfaces as not-found so ids cannot be enumerated across tenants.

use crate::model::{
    ContentCollection, ContentCorrelation, ContentNode, ContentStandardRelation,
    ControlledVocabulary, Jurisdiction, StandardNode, StandardNodeRelation, StandardsCrosswalk,
    StandardsDocument, Term, TermRelation,
};
use crate::path;
use crate::store::RegistryStore;
use crate::types::{JurisdictionId, RegistryError};
use serde::Serialize;

// =============================================================================
// REPRESENTATION FORMAT
// =============================================================================

/// Representation formats selectable by URI suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Html,
}

impl Format {
    /// Parse a suffix (without the dot). Unknown suffixes are rejected with
    /// [`RegistryError::FormatUnsupported`].
    pub fn from_suffix(suffix: &str) -> Result<Self, RegistryError> {
        match suffix {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(RegistryError::FormatUnsupported(other.to_string())),
        }
    }
}

// =============================================================================
// RESOURCE KINDS
// =============================================================================

/// Id-addressed resource kinds and their URI plurals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
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

impl ResourceKind {
    /// The plural URI segment for this kind.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Self::TermRelation => "termrels",
            Self::Document => "documents",
            Self::StandardNode => "standardnodes",
            Self::Crosswalk => "standardscrosswalks",
            Self::StandardNodeRelation => "standardnoderels",
            Self::Collection => "contentcollections",
            Self::ContentNode => "contentnodes",
            Self::Correlation => "contentcorrelations",
            Self::ContentStandardRelation => "contentstandardrels",
        }
    }

    /// Map a URI segment back to a kind.
    #[must_use]
    pub fn from_plural(segment: &str) -> Option<Self> {
        match segment {
            "termrels" => Some(Self::TermRelation),
            "documents" => Some(Self::Document),
            "standardnodes" => Some(Self::StandardNode),
            "standardscrosswalks" => Some(Self::Crosswalk),
            "standardnoderels" => Some(Self::StandardNodeRelation),
            "contentcollections" => Some(Self::Collection),
            "contentnodes" => Some(Self::ContentNode),
            "contentcorrelations" => Some(Self::Correlation),
            "contentstandardrels" => Some(Self::ContentStandardRelation),
            _ => None,
        }
    }
}

// =============================================================================
// PARSED URIS
// =============================================================================

/// The addressing coordinates extracted from a URI, before any lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Jurisdiction {
        jurisdiction: String,
    },
    Vocabulary {
        jurisdiction: String,
        vocabulary: String,
    },
    Term {
        jurisdiction: String,
        vocabulary: String,
        path: String,
    },
    Entity {
        jurisdiction: String,
        kind: ResourceKind,
        id: String,
    },
}

/// A parsed URI: the target coordinates plus an optional format suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUri {
    pub target: ResourceRef,
    pub format: Option<Format>,
}

/// Parse a canonical URI into [`ResourceRef`] coordinates.
///
/// Purely syntactic: no storage lookups happen here. Trailing slashes are
/// not tolerated (an empty segment is invalid).
pub fn parse_uri(uri: &str) -> Result<ParsedUri, RegistryError> {
    let Some(rest) = uri.strip_prefix('/') else {
        return Err(RegistryError::InvalidSegment(format!(
            "URI must start with '/': {uri:?}"
        )));
    };
    if rest.is_empty() {
        return Err(RegistryError::InvalidSegment("empty URI".to_string()));
    }
    let mut segments: Vec<String> = rest.split('/').map(str::to_string).collect();

    // Split the format suffix off the final segment before validation.
    let mut format = None;
    if let Some(last) = segments.last_mut()
        && let Some(dot) = last.rfind('.')
    {
        let suffix = last[dot + 1..].to_string();
        format = Some(Format::from_suffix(&suffix)?);
        last.truncate(dot);
    }
    for segment in &segments {
        path::validate_segment(segment)?;
    }

    let jurisdiction = segments[0].clone();
    let target = match segments.len() {
        1 => ResourceRef::Jurisdiction { jurisdiction },
        _ if segments[1] == "terms" => match segments.len() {
            2 => {
                return Err(RegistryError::InvalidSegment(
                    "vocabulary name missing after /terms".to_string(),
                ));
            }
            3 => ResourceRef::Vocabulary {
                jurisdiction,
                vocabulary: segments[2].clone(),
            },
            _ => ResourceRef::Term {
                jurisdiction,
                vocabulary: segments[2].clone(),
                path: segments[3..].join(path::PATH_SEPARATOR),
            },
        },
        3 => {
            let kind = ResourceKind::from_plural(&segments[1]).ok_or_else(|| {
                RegistryError::NotFound(format!("no such resource collection {:?}", segments[1]))
            })?;
            ResourceRef::Entity {
                jurisdiction,
                kind,
                id: segments[2].clone(),
            }
        }
        _ => {
            return Err(RegistryError::InvalidSegment(format!(
                "unrecognized URI shape: {uri:?}"
            )));
        }
    };
    Ok(ParsedUri { target, format })
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// A successfully resolved entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    Jurisdiction(Jurisdiction),
    Vocabulary(ControlledVocabulary),
    Term(Term),
    TermRelation(TermRelation),
    Document(StandardsDocument),
    StandardNode(StandardNode),
    Crosswalk(StandardsCrosswalk),
    StandardNodeRelation(StandardNodeRelation),
    Collection(ContentCollection),
    ContentNode(ContentNode),
    Correlation(ContentCorrelation),
    ContentStandardRelation(ContentStandardRelation),
}

impl Resolved {
    /// The resolved entity's id, regardless of kind.
    #[must_use]
    pub fn id_str(&self) -> &str {
        match self {
            Resolved::Jurisdiction(e) => e.id.as_str(),
            Resolved::Vocabulary(e) => e.id.as_str(),
            Resolved::Term(e) => e.id.as_str(),
            Resolved::TermRelation(e) => e.id.as_str(),
            Resolved::Document(e) => e.id.as_str(),
            Resolved::StandardNode(e) => e.id.as_str(),
            Resolved::Crosswalk(e) => e.id.as_str(),
            Resolved::StandardNodeRelation(e) => e.id.as_str(),
            Resolved::Collection(e) => e.id.as_str(),
            Resolved::ContentNode(e) => e.id.as_str(),
            Resolved::Correlation(e) => e.id.as_str(),
            Resolved::ContentStandardRelation(e) => e.id.as_str(),
        }
    }
}

fn not_found(what: impl Into<String>) -> RegistryError {
    RegistryError::NotFound(what.into())
}

fn lookup_jurisdiction(
    store: &dyn RegistryStore,
    name: &str,
) -> Result<Jurisdiction, RegistryError> {
    store
        .jurisdiction_by_name(name)?
        .ok_or_else(|| not_found(format!("jurisdiction {name:?}")))
}

fn check_owner(
    claimed: &JurisdictionId,
    actual: &JurisdictionId,
    id: &str,
) -> Result<(), RegistryError> {
    if claimed == actual {
        Ok(())
    } else {
        Err(RegistryError::CrossTenantReference(id.to_string()))
    }
}

/// Resolve parsed coordinates to the entity they address.
///
/// For id-addressed kinds the entity's ownership chain is walked up to its
/// jurisdiction and compared against the URI's jurisdiction segment.
pub fn resolve(
    store: &dyn RegistryStore,
    target: &ResourceRef,
) -> Result<Resolved, RegistryError> {
    match target {
        ResourceRef::Jurisdiction { jurisdiction } => Ok(Resolved::Jurisdiction(
            lookup_jurisdiction(store, jurisdiction)?,
        )),
        ResourceRef::Vocabulary {
            jurisdiction,
            vocabulary,
        } => {
            let juri = lookup_jurisdiction(store, jurisdiction)?;
            let vocab = store
                .vocabulary_by_key(&juri.id, vocabulary)?
                .ok_or_else(|| not_found(format!("vocabulary {vocabulary:?}")))?;
            Ok(Resolved::Vocabulary(vocab))
        }
        ResourceRef::Term {
            jurisdiction,
            vocabulary,
            path: term_path,
        } => {
            path::validate(term_path)?;
            let juri = lookup_jurisdiction(store, jurisdiction)?;
            let vocab = store
                .vocabulary_by_key(&juri.id, vocabulary)?
                .ok_or_else(|| not_found(format!("vocabulary {vocabulary:?}")))?;
            let term = store
                .term_by_path(&vocab.id, term_path)?
                .ok_or_else(|| not_found(format!("term {term_path:?}")))?;
            Ok(Resolved::Term(term))
        }
        ResourceRef::Entity {
            jurisdiction,
            kind,
            id,
        } => {
            let juri = lookup_jurisdiction(store, jurisdiction)?;
            resolve_entity(store, &juri.id, *kind, id)
        }
    }
}

fn resolve_entity(
    store: &dyn RegistryStore,
    jurisdiction: &JurisdictionId,
    kind: ResourceKind,
    id: &str,
) -> Result<Resolved, RegistryError> {
    let missing = || not_found(id);
    match kind {
        ResourceKind::TermRelation => {
            let rel = store
                .term_relation(&crate::types::TermRelationId::from_string(id))?
                .ok_or_else(missing)?;
            check_owner(jurisdiction, &rel.jurisdiction, id)?;
            Ok(Resolved::TermRelation(rel))
        }
        ResourceKind::Document => {
            let doc = store
                .document(&crate::types::DocumentId::from_string(id))?
                .ok_or_else(missing)?;
            check_owner(jurisdiction, &doc.jurisdiction, id)?;
            Ok(Resolved::Document(doc))
        }
        ResourceKind::StandardNode => {
            let node = store
                .standard_node(&crate::types::StandardNodeId::from_string(id))?
                .ok_or_else(missing)?;
            let doc = store.document(&node.document)?.ok_or_else(missing)?;
            check_owner(jurisdiction, &doc.jurisdiction, id)?;
            Ok(Resolved::StandardNode(node))
        }
        ResourceKind::Crosswalk => {
            let cw = store
                .crosswalk(&crate::types::CrosswalkId::from_string(id))?
                .ok_or_else(missing)?;
            check_owner(jurisdiction, &cw.jurisdiction, id)?;
            Ok(Resolved::Crosswalk(cw))
        }
        ResourceKind::StandardNodeRelation => {
            let rel = store
                .standard_node_relation(&crate::types::StandardNodeRelationId::from_string(id))?
                .ok_or_else(missing)?;
            let cw = store.crosswalk(&rel.crosswalk)?.ok_or_else(missing)?;
            check_owner(jurisdiction, &cw.jurisdiction, id)?;
            Ok(Resolved::StandardNodeRelation(rel))
        }
        ResourceKind::Collection => {
            let coll = store
                .collection(&crate::types::CollectionId::from_string(id))?
                .ok_or_else(missing)?;
            check_owner(jurisdiction, &coll.jurisdiction, id)?;
            Ok(Resolved::Collection(coll))
        }
        ResourceKind::ContentNode => {
            let node = store
                .content_node(&crate::types::ContentNodeId::from_string(id))?
                .ok_or_else(missing)?;
            let coll = store.collection(&node.collection)?.ok_or_else(missing)?;
            check_owner(jurisdiction, &coll.jurisdiction, id)?;
            Ok(Resolved::ContentNode(node))
        }
        ResourceKind::Correlation => {
            let corr = store
                .correlation(&crate::types::CorrelationId::from_string(id))?
                .ok_or_else(missing)?;
            check_owner(jurisdiction, &corr.jurisdiction, id)?;
            Ok(Resolved::Correlation(corr))
        }
        ResourceKind::ContentStandardRelation => {
            let rel = store
                .content_standard_relation(
                    &crate::types::ContentStandardRelationId::from_string(id),
                )?
                .ok_or_else(missing)?;
            let corr = store.correlation(&rel.correlation)?.ok_or_else(missing)?;
            check_owner(jurisdiction, &corr.jurisdiction, id)?;
            Ok(Resolved::ContentStandardRelation(rel))
        }
    }
}

/// Parse and resolve in one step.
pub fn resolve_uri(store: &dyn RegistryStore, uri: &str) -> Result<Resolved, RegistryError> {
    let parsed = parse_uri(uri)?;
    resolve(store, &parsed.target)
}

// =============================================================================
// CANONICAL URIS
// =============================================================================

/// The canonical URI of a resolved entity. The inverse of [`resolve_uri`]:
/// for any stored entity, `resolve_uri(uri_of(e)) == e`.
pub fn uri_of(store: &dyn RegistryStore, entity: &Resolved) -> Result<String, RegistryError> {
    let juri_name = |jid: &JurisdictionId| -> Result<String, RegistryError> {
        store
            .jurisdiction(jid)?
            .map(|j| j.name)
            .ok_or_else(|| not_found(jid.0.clone()))
    };
    match entity {
        Resolved::Jurisdiction(j) => Ok(j.uri()),
        Resolved::Vocabulary(v) => Ok(v.uri_in(&juri_name(&v.jurisdiction)?)),
        Resolved::Term(t) => {
            let vocab = store
                .vocabulary(&t.vocabulary)?
                .ok_or_else(|| not_found(t.vocabulary.0.clone()))?;
            Ok(t.uri_in(&juri_name(&vocab.jurisdiction)?, &vocab.name))
        }
        Resolved::TermRelation(r) => Ok(r.uri_in(&juri_name(&r.jurisdiction)?)),
        Resolved::Document(d) => Ok(d.uri_in(&juri_name(&d.jurisdiction)?)),
        Resolved::StandardNode(n) => {
            let doc = store
                .document(&n.document)?
                .ok_or_else(|| not_found(n.document.0.clone()))?;
            Ok(n.uri_in(&juri_name(&doc.jurisdiction)?))
        }
        Resolved::Crosswalk(c) => Ok(c.uri_in(&juri_name(&c.jurisdiction)?)),
        Resolved::StandardNodeRelation(r) => {
            let cw = store
                .crosswalk(&r.crosswalk)?
                .ok_or_else(|| not_found(r.crosswalk.0.clone()))?;
            Ok(r.uri_in(&juri_name(&cw.jurisdiction)?))
        }
        Resolved::Collection(c) => Ok(c.uri_in(&juri_name(&c.jurisdiction)?)),
        Resolved::ContentNode(n) => {
            let coll = store
                .collection(&n.collection)?
                .ok_or_else(|| not_found(n.collection.0.clone()))?;
            Ok(n.uri_in(&juri_name(&coll.jurisdiction)?))
        }
        Resolved::Correlation(c) => Ok(c.uri_in(&juri_name(&c.jurisdiction)?)),
        Resolved::ContentStandardRelation(r) => {
            let corr = store
                .correlation(&r.correlation)?
                .ok_or_else(|| not_found(r.correlation.0.clone()))?;
            Ok(r.uri_in(&juri_name(&corr.jurisdiction)?))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use crate::types::{DocumentId, TermId, VocabularyId};

    fn seeded_store() -> MemStore {
        let mut store = MemStore::new();
        store
            .insert_jurisdiction(Jurisdiction {
                id: JurisdictionId::from_string("Jghana123"),
                name: "Ghana".to_string(),
                display_name: "Ghana NaCCA".to_string(),
                ..Jurisdiction::default()
            })
            .expect("juri");
        store
            .insert_vocabulary(ControlledVocabulary {
                id: VocabularyId::from_string("Vgrades12"),
                jurisdiction: JurisdictionId::from_string("Jghana123"),
                name: "GradeLevels".to_string(),
                label: "Grade Levels".to_string(),
                ..ControlledVocabulary::default()
            })
            .expect("vocab");
        store
            .insert_term(Term {
                id: TermId::from_string("Tb2level2"),
                vocabulary: VocabularyId::from_string("Vgrades12"),
                path: "B2/2".to_string(),
                label: "Basic 2, Term 2".to_string(),
                ..Term::default()
            })
            .expect("term");
        store
            .insert_document(StandardsDocument {
                id: DocumentId::from_string("Dmath1234"),
                name: "GhanaMath".to_string(),
                jurisdiction: JurisdictionId::from_string("Jghana123"),
                title: "Mathematics Curriculum".to_string(),
                ..StandardsDocument::default()
            })
            .expect("doc");
        store
    }

    #[test]
    fn deep_term_path_resolves() {
        let store = seeded_store();
        let Resolved::Term(term) =
            resolve_uri(&store, "/Ghana/terms/GradeLevels/B2/2").expect("resolve")
        else {
            panic!("expected a term");
        };
        assert_eq!(term.label, "Basic 2, Term 2");
    }

    #[test]
    fn format_suffix_never_changes_the_entity() {
        let store = seeded_store();
        let plain = parse_uri("/Ghana/terms/GradeLevels/B2/2").expect("parse");
        let json = parse_uri("/Ghana/terms/GradeLevels/B2/2.json").expect("parse");
        let html = parse_uri("/Ghana/terms/GradeLevels/B2/2.html").expect("parse");
        assert_eq!(plain.target, json.target);
        assert_eq!(plain.target, html.target);
        assert_eq!(plain.format, None);
        assert_eq!(json.format, Some(Format::Json));
        assert_eq!(html.format, Some(Format::Html));
        assert!(matches!(
            parse_uri("/Ghana/terms/GradeLevels/B2/2.xml"),
            Err(RegistryError::FormatUnsupported(_))
        ));
    }

    #[test]
    fn canonical_uri_round_trips() {
        let store = seeded_store();
        for uri in [
            "/Ghana",
            "/Ghana/terms/GradeLevels",
            "/Ghana/terms/GradeLevels/B2/2",
            "/Ghana/documents/Dmath1234",
        ] {
            let entity = resolve_uri(&store, uri).expect("resolve");
            assert_eq!(uri_of(&store, &entity).expect("uri"), uri);
        }
    }

    #[test]
    fn cross_tenant_ids_do_not_resolve() {
        let mut store = seeded_store();
        store
            .insert_jurisdiction(Jurisdiction {
                id: JurisdictionId::from_string("Jkenya123"),
                name: "Kenya".to_string(),
                display_name: "KICD".to_string(),
                ..Jurisdiction::default()
            })
            .expect("juri");
        // The document id is real, but it belongs to Ghana.
        let err = resolve_uri(&store, "/Kenya/documents/Dmath1234");
        assert!(matches!(err, Err(RegistryError::CrossTenantReference(_))));
    }

    #[test]
    fn malformed_uris_are_rejected() {
        assert!(matches!(
            parse_uri("Ghana/terms"),
            Err(RegistryError::InvalidSegment(_))
        ));
        assert!(matches!(
            parse_uri("/Ghana//terms"),
            Err(RegistryError::InvalidSegment(_))
        ));
        assert!(matches!(
            parse_uri("/Ghana/terms"),
            Err(RegistryError::InvalidSegment(_))
        ));
    }

    // A plural nobody registered addresses nothing, so it is a missing
    // resource rather than a malformed URI.
    #[test]
    fn unknown_resource_plural_is_not_found() {
        assert!(matches!(
            parse_uri("/Ghana/widgets/W123"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_rows_are_not_found() {
        let store = seeded_store();
        assert!(matches!(
            resolve_uri(&store, "/Ghana/terms/GradeLevels/B9"),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            resolve_uri(&store, "/Nowhere"),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            resolve_uri(&store, "/Ghana/documents/Dmissing1"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn plurals_round_trip() {
        for kind in [
            ResourceKind::TermRelation,
            ResourceKind::Document,
            ResourceKind::StandardNode,
            ResourceKind::Crosswalk,
            ResourceKind::StandardNodeRelation,
            ResourceKind::Collection,
            ResourceKind::ContentNode,
            ResourceKind::Correlation,
            ResourceKind::ContentStandardRelation,
        ] {
            assert_eq!(ResourceKind::from_plural(kind.plural()), Some(kind));
        }
    }
}
