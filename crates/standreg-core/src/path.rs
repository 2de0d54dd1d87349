//! # Hierarchical Path Codec
//!
//! Converts between a term's stored `path` string and its logical ancestry
//! chain. Paths are `/`-separated sequences of URL-safe segments; the
//! segment sequence encodes ancestry (`"B2/2"` is a child of `"B2"`).
//!
//! The codec is pure string logic with no I/O. Sibling uniqueness is NOT the
//! codec's concern: that is delegated to the `(vocabulary, path)` unique key
//! in the store.

use crate::types::RegistryError;

/// Separator between path segments.
pub const PATH_SEPARATOR: &str = "/";

/// Check whether a single character is allowed inside a segment.
///
/// Allowed: ASCII letters, digits, `_`, `-`. Dots are rejected so that a
/// format suffix like `.json` can never be confused with path content.
#[must_use]
pub fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validate one path segment.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidSegment`] if the segment is empty,
/// contains a `/`, or contains characters outside the URL-safe set.
pub fn validate_segment(segment: &str) -> Result<(), RegistryError> {
    if segment.is_empty() {
        return Err(RegistryError::InvalidSegment("empty segment".to_string()));
    }
    if let Some(bad) = segment.chars().find(|c| !is_segment_char(*c)) {
        return Err(RegistryError::InvalidSegment(format!(
            "segment {:?} contains disallowed character {:?}",
            segment, bad
        )));
    }
    Ok(())
}

/// Validate a full path.
///
/// The empty path is invalid, as are leading or trailing slashes (both show
/// up as empty segments after splitting).
pub fn validate(path: &str) -> Result<(), RegistryError> {
    if path.is_empty() {
        return Err(RegistryError::InvalidSegment("empty path".to_string()));
    }
    for segment in path.split(PATH_SEPARATOR) {
        validate_segment(segment)?;
    }
    Ok(())
}

/// Return the parent path, or `None` for a top-level path.
///
/// Does not validate: callers that accept external input should run
/// [`validate`] first.
#[must_use]
pub fn parent_path(path: &str) -> Option<&str> {
    path.rfind(PATH_SEPARATOR).map(|idx| &path[..idx])
}

/// Join a parent path and a child segment.
///
/// An empty parent produces a top-level path.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidSegment`] if the segment is not a single
/// valid segment.
pub fn join(parent: &str, segment: &str) -> Result<String, RegistryError> {
    validate_segment(segment)?;
    if parent.is_empty() {
        Ok(segment.to_string())
    } else {
        Ok(format!("{parent}{PATH_SEPARATOR}{segment}"))
    }
}

/// Split a path into its segments.
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split(PATH_SEPARATOR).collect()
    }
}

/// Number of segments in the path. The empty path has depth 0.
#[must_use]
pub fn depth(path: &str) -> usize {
    segments(path).len()
}

/// The last segment of the path, or `None` for the empty path.
#[must_use]
pub fn leaf(path: &str) -> Option<&str> {
    path.rsplit(PATH_SEPARATOR).next().filter(|s| !s.is_empty())
}

/// Iterate over all proper ancestor paths, nearest first.
///
/// `ancestors("A/B/C")` yields `"A/B"` then `"A"`. Used by importers to
/// check that intermediate rows exist when parent rows are required.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(parent_path(path), |p| parent_path(p))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_nested_path() {
        assert_eq!(parent_path("B2/2"), Some("B2"));
        assert_eq!(parent_path("A/B/C"), Some("A/B"));
    }

    #[test]
    fn parent_of_top_level_is_none() {
        assert_eq!(parent_path("B2"), None);
    }

    #[test]
    fn join_builds_child_path() {
        assert_eq!(join("B2", "2").ok(), Some("B2/2".to_string()));
        assert_eq!(join("", "B2").ok(), Some("B2".to_string()));
    }

    #[test]
    fn join_rejects_slash_in_segment() {
        assert!(join("B2", "2/3").is_err());
    }

    #[test]
    fn validate_rejects_empty_and_stray_slashes() {
        assert!(validate("").is_err());
        assert!(validate("/B2").is_err());
        assert!(validate("B2/").is_err());
        assert!(validate("B2//2").is_err());
    }

    #[test]
    fn validate_rejects_disallowed_characters() {
        assert!(validate("B2.json").is_err());
        assert!(validate("B 2").is_err());
        assert!(validate("B2/ä").is_err());
        assert!(validate("Grade_1-a/2").is_ok());
    }

    #[test]
    fn ancestors_nearest_first() {
        let chain: Vec<&str> = ancestors("A/B/C").collect();
        assert_eq!(chain, vec!["A/B", "A"]);
        assert_eq!(ancestors("A").count(), 0);
    }

    #[test]
    fn depth_and_leaf() {
        assert_eq!(depth("A/B/C"), 3);
        assert_eq!(depth(""), 0);
        assert_eq!(leaf("A/B/C"), Some("C"));
        assert_eq!(leaf(""), None);
    }
}
