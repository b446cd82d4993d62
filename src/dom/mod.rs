//! DOM Module - Arena-based markup document
//!
//! Implements an efficient DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for names, attribute values and text
//!
//! The matching engine never touches [`Document`] directly; it reads trees
//! through the [`DocumentAccess`] capability trait.

pub mod document;
pub mod node;
pub mod strings;

pub use document::Document;
pub use node::{Attr, Node, NodeId, NodeKind, DOCUMENT_NODE};
pub use strings::StringPool;

/// Read-only view of a parsed tree: tag names, attributes, text, and links.
///
/// Implementors provide the handful of primitive lookups; navigation helpers
/// are derived from them.
pub trait DocumentAccess {
    /// Get a node by ID
    fn get_node(&self, id: NodeId) -> Option<&Node>;

    /// Tag name of an element (as stored: lower-cased for HTML documents)
    fn node_name(&self, id: NodeId) -> Option<&str>;

    /// Content of a text or CDATA node
    fn text_content(&self, id: NodeId) -> Option<&str>;

    /// Attribute name/value pairs of an element, in source order
    fn attribute_pairs(&self, id: NodeId) -> Vec<(&str, &str)>;

    /// Interned attribute value ids of an element, as (name_id, value_id)
    fn attribute_ids(&self, id: NodeId) -> Vec<(u32, u32)>;

    /// The string pool backing the ids returned by [`Self::attribute_ids`]
    fn strings(&self) -> &StringPool;

    /// Get attribute value by name
    fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attribute_pairs(id)
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.get_node(id).is_some_and(Node::is_element)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.parent
    }

    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.next_sibling
    }

    fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.prev_sibling
    }

    /// All child nodes in document order
    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut child = self.get_node(id).and_then(|n| n.first_child);
        while let Some(cid) = child {
            result.push(cid);
            child = self.next_sibling_of(cid);
        }
        result
    }

    /// Element children in document order
    fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children_vec(id)
            .into_iter()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// Depth-first, document-order iterator over all descendants of `id`
    fn descendants(&self, id: NodeId) -> Descendants<'_, Self>
    where
        Self: Sized,
    {
        Descendants::new(self, id)
    }

    /// Every element in the tree, depth-first in document order
    fn elements(&self) -> Vec<NodeId>
    where
        Self: Sized,
    {
        self.descendants(DOCUMENT_NODE)
            .filter(|&id| self.is_element(id))
            .collect()
    }

    /// Element ancestors of `id`, ordered from the top-level element down to the parent
    fn element_ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(pid) = current {
            if self.is_element(pid) {
                chain.push(pid);
            }
            current = self.parent_of(pid);
        }
        chain.reverse();
        chain
    }

    /// Direct text of an element: its own text/CDATA children, whitespace-collapsed
    fn direct_text(&self, id: NodeId) -> String {
        let mut words: Vec<&str> = Vec::new();
        for child in self.children_vec(id) {
            if let Some(text) = self.text_content(child) {
                words.extend(text.split_whitespace());
            }
        }
        words.join(" ")
    }
}

/// Iterator over descendant nodes (depth-first, document order)
pub struct Descendants<'d, D: DocumentAccess> {
    doc: &'d D,
    stack: Vec<NodeId>,
}

impl<'d, D: DocumentAccess> Descendants<'d, D> {
    fn new(doc: &'d D, id: NodeId) -> Self {
        let mut iter = Descendants { doc, stack: Vec::new() };
        iter.push_children(id);
        iter
    }

    /// Push children in reverse order so the first child is popped first
    fn push_children(&mut self, id: NodeId) {
        let mut child_id = self.doc.get_node(id).and_then(|n| n.last_child);
        while let Some(cid) = child_id {
            self.stack.push(cid);
            child_id = self.doc.prev_sibling_of(cid);
        }
    }
}

impl<'d, D: DocumentAccess> Iterator for Descendants<'d, D> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.push_children(current);
        Some(current)
    }
}
