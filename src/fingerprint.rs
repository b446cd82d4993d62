//! Reference fingerprints
//!
//! A [`Fingerprint`] is an owned snapshot of everything the scorer needs to
//! know about the labeled element. It borrows nothing from the tree it was
//! taken from, so the original document can be dropped once it exists.

use crate::dom::{DocumentAccess, NodeId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Feature snapshot of one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fingerprint {
    /// Tag name as stored in the source tree
    pub tag: String,
    /// Attribute map
    pub attributes: BTreeMap<String, String>,
    /// Direct text, whitespace-collapsed
    pub text: String,
    /// Ancestor element tags from the top-level element down to the parent
    pub ancestors: Vec<String>,
    /// Tags of the other element children of the parent, with multiplicity
    pub siblings: BTreeMap<String, usize>,
    /// Depth below the document node (top-level elements are at depth 1)
    pub depth: usize,
}

impl Fingerprint {
    /// Snapshot the features of `node`
    pub fn extract<D: DocumentAccess>(doc: &D, node: NodeId) -> Self {
        let attributes = doc
            .attribute_pairs(node)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let ancestors = doc
            .element_ancestors(node)
            .into_iter()
            .filter_map(|id| doc.node_name(id).map(str::to_string))
            .collect();

        let siblings = sibling_tags(doc, node)
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();

        Fingerprint {
            tag: doc.node_name(node).unwrap_or_default().to_string(),
            attributes,
            text: doc.direct_text(node),
            ancestors,
            siblings,
            depth: doc.get_node(node).map_or(0, |n| n.depth as usize),
        }
    }
}

/// Free-function form of [`Fingerprint::extract`]
pub fn extract<D: DocumentAccess>(doc: &D, node: NodeId) -> Fingerprint {
    Fingerprint::extract(doc, node)
}

/// Multiset of the tags of `node`'s element siblings, excluding `node` itself
pub(crate) fn sibling_tags<D: DocumentAccess>(doc: &D, node: NodeId) -> BTreeMap<&str, usize> {
    let mut tags = BTreeMap::new();
    let Some(parent) = doc.parent_of(node) else {
        return tags;
    };
    for sibling in doc.element_children(parent) {
        if sibling == node {
            continue;
        }
        if let Some(tag) = doc.node_name(sibling) {
            *tags.entry(tag).or_insert(0) += 1;
        }
    }
    tags
}
