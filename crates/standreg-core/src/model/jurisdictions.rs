//! Jurisdictions: the top-level organizational namespaces under which
//! standards documents are published. Institutions that publish standards
//! include ministries, curriculum bodies, assessment boards, and
//! professional organizations.

use crate::types::JurisdictionId;
use serde::{Deserialize, Serialize};

/// A tenant namespace. The `name` is used as the leading URI segment for
/// everything the jurisdiction owns, so renaming a referenced jurisdiction
/// would break all derived URIs. That immutability is NOT enforced; it is a
/// documented invariant gap carried over from the data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Jurisdiction {
    pub id: JurisdictionId,
    /// The name used in URIs. Must be a valid path segment.
    pub name: String,
    /// Official name of the organization or government body.
    pub display_name: String,
    pub alt_name: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country: Option<String>,
    /// BCP47 language code like `en`, `es`, `fr-CA`.
    pub language: Option<String>,
    pub notes: Option<String>,
    pub website_url: Option<String>,
}

impl Jurisdiction {
    /// Canonical URI: `/{name}`.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("/{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_is_name_segment() {
        let juri = Jurisdiction {
            name: "Ghana".to_string(),
            display_name: "Ghana NaCCA".to_string(),
            ..Jurisdiction::default()
        };
        assert_eq!(juri.uri(), "/Ghana");
    }
}
