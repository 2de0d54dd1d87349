//! # Tree Integrity
//!
//! Attach/detach rules for the two node hierarchies (standard nodes in
//! documents, content nodes in collections). All tree mutations go through
//! this module so the structural invariants hold everywhere:
//!
//! - exactly zero or one root node per document/collection
//! - `depth` is always `parent.depth + 1`
//! - a child always belongs to the same document/collection as its parent
//! - sibling order is carried by a float `sort_order`; inserting between
//!   two siblings takes the midpoint of their keys and never renumbers
//!   the rest of the row set

use crate::model::{ContentNode, StandardNode};
use crate::store::RegistryStore;
use crate::types::{CollectionId, ContentNodeId, DocumentId, RegistryError, StandardNodeId};

// =============================================================================
// SORT KEYS
// =============================================================================

/// Gap left between appended siblings.
pub const SORT_KEY_STEP: f64 = 1.0;

/// Sort key for a position bounded by the given neighbor keys.
///
/// `None` on a side means there is no sibling on that side. Between two
/// siblings the midpoint is used, so repeated insertion at the same spot
/// keeps narrowing the interval instead of shifting other rows.
#[must_use]
pub fn sort_key_between(prev: Option<f64>, next: Option<f64>) -> f64 {
    match (prev, next) {
        (None, None) => SORT_KEY_STEP,
        (Some(prev), None) => prev + SORT_KEY_STEP,
        (None, Some(next)) => next - SORT_KEY_STEP,
        (Some(prev), Some(next)) => (prev + next) / 2.0,
    }
}

/// Where to place a node among its new siblings.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Placement<Id> {
    First,
    #[default]
    Last,
    Before(Id),
    After(Id),
}

fn placement_key<Id: PartialEq, N>(
    siblings: &[N],
    placement: &Placement<Id>,
    id_of: impl Fn(&N) -> &Id,
    key_of: impl Fn(&N) -> f64,
) -> Result<f64, RegistryError>
where
    Id: std::fmt::Display,
{
    let position = |anchor: &Id| {
        siblings
            .iter()
            .position(|n| id_of(n) == anchor)
            .ok_or_else(|| {
                RegistryError::Validation(format!("anchor sibling {anchor} not found"))
            })
    };
    let key_at = |i: usize| siblings.get(i).map(&key_of);
    Ok(match placement {
        Placement::First => sort_key_between(None, key_at(0)),
        Placement::Last => sort_key_between(siblings.last().map(&key_of), None),
        Placement::Before(anchor) => {
            let i = position(anchor)?;
            sort_key_between(if i > 0 { key_at(i - 1) } else { None }, key_at(i))
        }
        Placement::After(anchor) => {
            let i = position(anchor)?;
            sort_key_between(key_at(i), key_at(i + 1))
        }
    })
}

// =============================================================================
// STANDARD NODE TREES
// =============================================================================

/// Insert `node` as the root of its document. Fails with
/// [`RegistryError::DuplicateRoot`] if the document already has a root.
pub fn insert_standard_root(
    store: &mut dyn RegistryStore,
    mut node: StandardNode,
) -> Result<StandardNode, RegistryError> {
    node.parent = None;
    node.depth = 0;
    node.sort_order = SORT_KEY_STEP;
    store.insert_standard_node(node.clone())?;
    Ok(node)
}

/// Attach `node` under `parent`. The document, depth, and sort key are
/// derived here; whatever the caller put in those fields is overwritten.
pub fn attach_standard_child(
    store: &mut dyn RegistryStore,
    mut node: StandardNode,
    parent: &StandardNodeId,
    placement: Placement<StandardNodeId>,
) -> Result<StandardNode, RegistryError> {
    let parent_row = store
        .standard_node(parent)?
        .ok_or_else(|| RegistryError::NotFound(parent.0.clone()))?;
    let siblings = store.standard_children(parent)?;
    node.parent = Some(parent_row.id.clone());
    node.document = parent_row.document;
    node.depth = parent_row.depth + 1;
    node.sort_order = placement_key(&siblings, &placement, |n| &n.id, |n| n.sort_order)?;
    store.insert_standard_node(node.clone())?;
    Ok(node)
}

/// Delete a node and every node below it, returning the number of rows
/// removed. Relation edges referencing removed nodes go with them.
pub fn delete_standard_subtree(
    store: &mut dyn RegistryStore,
    root: &StandardNodeId,
) -> Result<usize, RegistryError> {
    if store.standard_node(root)?.is_none() {
        return Err(RegistryError::NotFound(root.0.clone()));
    }
    // Collect top-down, delete bottom-up.
    let mut ordered = vec![root.clone()];
    let mut cursor = 0;
    while cursor < ordered.len() {
        for child in store.standard_children(&ordered[cursor])? {
            ordered.push(child.id);
        }
        cursor += 1;
    }
    for id in ordered.iter().rev() {
        store.delete_standard_node(id)?;
    }
    Ok(ordered.len())
}

/// Structural audit of one document tree. Returns human-readable findings;
/// an empty list means the tree is sound.
pub fn check_document_tree(
    store: &dyn RegistryStore,
    document: &DocumentId,
) -> Result<Vec<String>, RegistryError> {
    let nodes = store.standard_nodes_in(document)?;
    let mut findings = Vec::new();
    let roots = nodes.iter().filter(|n| n.is_root()).count();
    if nodes.is_empty() {
        findings.push("document has no nodes".to_string());
    } else if roots == 0 {
        findings.push("document has nodes but no root".to_string());
    } else if roots > 1 {
        findings.push(format!("document has {roots} root nodes"));
    }
    for node in &nodes {
        let Some(parent_id) = &node.parent else {
            if node.depth != 0 {
                findings.push(format!("root {} has depth {}", node.id, node.depth));
            }
            continue;
        };
        match store.standard_node(parent_id)? {
            None => findings.push(format!("node {} has missing parent {parent_id}", node.id)),
            Some(parent) => {
                if parent.document != node.document {
                    findings.push(format!("node {} crosses into another document", node.id));
                }
                if node.depth != parent.depth + 1 {
                    findings.push(format!(
                        "node {} depth {} does not follow parent depth {}",
                        node.id, node.depth, parent.depth
                    ));
                }
            }
        }
    }
    Ok(findings)
}

// =============================================================================
// CONTENT NODE TREES
// =============================================================================

/// Insert `node` as the root of its collection. Fails with
/// [`RegistryError::DuplicateRoot`] if the collection already has a root.
pub fn insert_content_root(
    store: &mut dyn RegistryStore,
    mut node: ContentNode,
) -> Result<ContentNode, RegistryError> {
    node.parent = None;
    node.depth = 0;
    node.sort_order = SORT_KEY_STEP;
    store.insert_content_node(node.clone())?;
    Ok(node)
}

/// Attach `node` under `parent` in a collection tree.
pub fn attach_content_child(
    store: &mut dyn RegistryStore,
    mut node: ContentNode,
    parent: &ContentNodeId,
    placement: Placement<ContentNodeId>,
) -> Result<ContentNode, RegistryError> {
    let parent_row = store
        .content_node(parent)?
        .ok_or_else(|| RegistryError::NotFound(parent.0.clone()))?;
    let siblings = store.content_children(parent)?;
    node.parent = Some(parent_row.id.clone());
    node.collection = parent_row.collection;
    node.depth = parent_row.depth + 1;
    node.sort_order = placement_key(&siblings, &placement, |n| &n.id, |n| n.sort_order)?;
    store.insert_content_node(node.clone())?;
    Ok(node)
}

/// Delete a content node and every node below it.
pub fn delete_content_subtree(
    store: &mut dyn RegistryStore,
    root: &ContentNodeId,
) -> Result<usize, RegistryError> {
    if store.content_node(root)?.is_none() {
        return Err(RegistryError::NotFound(root.0.clone()));
    }
    let mut ordered = vec![root.clone()];
    let mut cursor = 0;
    while cursor < ordered.len() {
        for child in store.content_children(&ordered[cursor])? {
            ordered.push(child.id);
        }
        cursor += 1;
    }
    for id in ordered.iter().rev() {
        store.delete_content_node(id)?;
    }
    Ok(ordered.len())
}

/// Structural audit of one collection tree.
pub fn check_collection_tree(
    store: &dyn RegistryStore,
    collection: &CollectionId,
) -> Result<Vec<String>, RegistryError> {
    let nodes = store.content_nodes_in(collection)?;
    let mut findings = Vec::new();
    let roots = nodes.iter().filter(|n| n.is_root()).count();
    if nodes.is_empty() {
        findings.push("collection has no nodes".to_string());
    } else if roots == 0 {
        findings.push("collection has nodes but no root".to_string());
    } else if roots > 1 {
        findings.push(format!("collection has {roots} root nodes"));
    }
    for node in &nodes {
        let Some(parent_id) = &node.parent else {
            if node.depth != 0 {
                findings.push(format!("root {} has depth {}", node.id, node.depth));
            }
            continue;
        };
        match store.content_node(parent_id)? {
            None => findings.push(format!("node {} has missing parent {parent_id}", node.id)),
            Some(parent) => {
                if parent.collection != node.collection {
                    findings.push(format!("node {} crosses into another collection", node.id));
                }
                if node.depth != parent.depth + 1 {
                    findings.push(format!(
                        "node {} depth {} does not follow parent depth {}",
                        node.id, node.depth, parent.depth
                    ));
                }
            }
        }
    }
    Ok(findings)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn node(id: &str, description: &str) -> StandardNode {
        StandardNode {
            id: StandardNodeId::from_string(id),
            document: DocumentId::from_string("D1"),
            description: description.to_string(),
            ..StandardNode::default()
        }
    }

    #[test]
    fn midpoint_keys() {
        assert!((sort_key_between(None, None) - 1.0).abs() < f64::EPSILON);
        assert!((sort_key_between(Some(2.0), None) - 3.0).abs() < f64::EPSILON);
        assert!((sort_key_between(Some(1.0), Some(2.0)) - 1.5).abs() < f64::EPSILON);
        // Leading insert goes below the first key; negatives are fine.
        assert!(sort_key_between(None, Some(1.0)) < 1.0);
    }

    #[test]
    fn attach_derives_depth_document_and_order() {
        let mut store = MemStore::new();
        let root = insert_standard_root(&mut store, node("S1", "root")).expect("root");
        let a = attach_standard_child(&mut store, node("S2", "a"), &root.id, Placement::Last)
            .expect("attach");
        let b = attach_standard_child(&mut store, node("S3", "b"), &root.id, Placement::Last)
            .expect("attach");
        assert_eq!(a.depth, 1);
        assert!(a.sort_order < b.sort_order);

        // Insert between a and b without disturbing either key.
        let mid = attach_standard_child(
            &mut store,
            node("S4", "mid"),
            &root.id,
            Placement::After(a.id.clone()),
        )
        .expect("attach");
        assert!(a.sort_order < mid.sort_order && mid.sort_order < b.sort_order);

        let order: Vec<String> = store
            .standard_children(&root.id)
            .expect("children")
            .into_iter()
            .map(|n| n.description)
            .collect();
        assert_eq!(order, vec!["a", "mid", "b"]);
    }

    #[test]
    fn second_root_is_rejected() {
        let mut store = MemStore::new();
        insert_standard_root(&mut store, node("S1", "root")).expect("root");
        let err = insert_standard_root(&mut store, node("S2", "root again"));
        assert!(matches!(err, Err(RegistryError::DuplicateRoot(_))));
    }

    #[test]
    fn subtree_delete_removes_descendants_only() {
        let mut store = MemStore::new();
        let root = insert_standard_root(&mut store, node("S1", "root")).expect("root");
        let a = attach_standard_child(&mut store, node("S2", "a"), &root.id, Placement::Last)
            .expect("attach");
        attach_standard_child(&mut store, node("S3", "a1"), &a.id, Placement::Last)
            .expect("attach");
        let b = attach_standard_child(&mut store, node("S4", "b"), &root.id, Placement::Last)
            .expect("attach");

        let removed = delete_standard_subtree(&mut store, &a.id).expect("delete");
        assert_eq!(removed, 2);
        assert!(store.standard_node(&a.id).expect("read").is_none());
        assert!(store.standard_node(&b.id).expect("read").is_some());
        assert!(store.standard_node(&root.id).expect("read").is_some());
    }

    #[test]
    fn audit_flags_depth_drift() {
        let mut store = MemStore::new();
        let root = insert_standard_root(&mut store, node("S1", "root")).expect("root");
        // Bypass the guard to simulate a corrupted row.
        let rogue = StandardNode {
            parent: Some(root.id.clone()),
            depth: 5,
            ..node("S2", "rogue")
        };
        store.insert_standard_node(rogue).expect("insert");
        let findings =
            check_document_tree(&store, &DocumentId::from_string("D1")).expect("audit");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("depth"));
    }
}
