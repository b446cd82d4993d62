//! Markup Document - Arena-based DOM representation
//!
//! Efficient DOM storage with:
//! - Arena allocation for nodes and attributes
//! - NodeId indices for traversal
//! - String interning for names, attribute values and text
//!
//! The builder is lenient: it accepts well-formed XML as well as the
//! tag soup found in real HTML pages, and never rejects a UTF-8 input.

use super::node::{Attr, Node, NodeId, NodeKind, DOCUMENT_NODE};
use super::strings::StringPool;
use super::DocumentAccess;
use crate::error::{MatchError, Result};
use crate::path::Path;
use crate::reader::{MarkupEvent, SliceReader, StartElement};
use tracing::trace;

/// HTML elements that never have content
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Pairs of (opening tag, open element it implicitly closes)
const IMPLIED_END: &[(&str, &[&str])] = &[
    ("li", &["li"]),
    ("dt", &["dt", "dd"]),
    ("dd", &["dt", "dd"]),
    ("tr", &["tr", "td", "th"]),
    ("td", &["td", "th"]),
    ("th", &["td", "th"]),
    ("option", &["option"]),
    ("p", &["p"]),
];

/// A parsed document stored in arena format. Fully owned, so it can be
/// shared across threads once built.
#[derive(Debug)]
pub struct Document {
    /// Arena of nodes (index 0 is the document node)
    nodes: Vec<Node>,
    /// Arena of attributes
    attributes: Vec<Attr>,
    /// Interned strings
    strings: StringPool,
    /// First top-level element
    root_element: Option<NodeId>,
    /// Whether HTML tree rules were applied
    is_html: bool,
}

impl Document {
    /// Parse markup text into a tree. Never fails; malformed regions are
    /// recovered from as well as possible.
    pub fn parse(input: &str) -> Self {
        let mut doc = Document {
            nodes: Vec::with_capacity(input.len() / 16 + 1),
            attributes: Vec::new(),
            strings: StringPool::new(),
            root_element: None,
            is_html: false,
        };
        doc.nodes.push(Node::document());
        doc.build_from_events(input.as_bytes());
        trace!(nodes = doc.nodes.len(), html = doc.is_html, "document built");
        doc
    }

    /// Parse raw bytes. Input that is not UTF-8 is rejected.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(input)
            .map_err(|e| MatchError::ParseFailure(format!("input is not valid UTF-8: {e}")))?;
        Ok(Self::parse(text))
    }

    /// Build DOM from markup events
    fn build_from_events(&mut self, input: &[u8]) {
        let mut reader = SliceReader::new(input);
        // Open elements, innermost last; the document node is never popped
        let mut stack: Vec<NodeId> = vec![DOCUMENT_NODE];
        let mut mode_decided = false;

        while let Some(event) = reader.next_event() {
            if !mode_decided {
                if let Some(elem) = event.as_start_element() {
                    self.is_html = elem
                        .name_str()
                        .is_some_and(|n| n.eq_ignore_ascii_case("html"));
                    mode_decided = true;
                }
            }

            match event {
                MarkupEvent::DocType(body) => {
                    if !mode_decided {
                        let body = String::from_utf8_lossy(body.as_ref());
                        self.is_html = body
                            .trim_start()
                            .get(..4)
                            .is_some_and(|s| s.eq_ignore_ascii_case("html"));
                        mode_decided = true;
                    }
                }

                MarkupEvent::StartElement(elem) => self.open_element(elem, &mut stack, false),
                MarkupEvent::EmptyElement(elem) => self.open_element(elem, &mut stack, true),

                MarkupEvent::EndElement(end) => {
                    let name = self.normalize_name(&String::from_utf8_lossy(end.name.as_ref()));
                    self.close_element(&name, &mut stack);
                }

                MarkupEvent::Text(content) => {
                    let text = String::from_utf8_lossy(content.as_ref());
                    // Whitespace between tags carries nothing the matcher reads
                    if !text.trim().is_empty() {
                        let id = self.strings.intern(&text);
                        self.append_leaf(&stack, |parent, depth| Node::text(id, parent, depth));
                    }
                }

                MarkupEvent::CData(content) => {
                    let id = self.strings.intern(&String::from_utf8_lossy(content.as_ref()));
                    self.append_leaf(&stack, |parent, depth| Node::cdata(id, parent, depth));
                }

                MarkupEvent::Comment(content) => {
                    let id = self.strings.intern(&String::from_utf8_lossy(content.as_ref()));
                    self.append_leaf(&stack, |parent, depth| Node::comment(id, parent, depth));
                }

                MarkupEvent::ProcessingInstruction { target, .. } => {
                    let id = self.strings.intern(&String::from_utf8_lossy(target.as_ref()));
                    self.append_leaf(&stack, |parent, depth| {
                        Node::processing_instruction(id, parent, depth)
                    });
                }

                MarkupEvent::EndDocument => break,
            }
        }
    }

    fn normalize_name(&self, name: &str) -> String {
        if self.is_html {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Create an element node and, unless it can hold no content, make it
    /// the current insertion point
    fn open_element(&mut self, elem: StartElement<'_>, stack: &mut Vec<NodeId>, self_closed: bool) {
        let name = self.normalize_name(&String::from_utf8_lossy(elem.name.as_ref()));

        if self.is_html {
            self.apply_implied_end(&name, stack);
        }

        let parent_id = stack.last().copied().unwrap_or(DOCUMENT_NODE);
        let depth = u16::try_from(stack.len()).unwrap_or(u16::MAX);
        let name_id = self.strings.intern(&name);
        let mut node = Node::element(name_id, Some(parent_id), depth);

        node.attr_start = self.attributes.len() as u32;
        for attr in elem.attributes.iter().take(u16::MAX as usize) {
            let attr_name = self.normalize_name(&String::from_utf8_lossy(attr.name.as_ref()));
            let attr_name_id = self.strings.intern(&attr_name);
            let value_id = self.strings.intern(&String::from_utf8_lossy(attr.value.as_ref()));
            self.attributes.push(Attr::new(attr_name_id, value_id));
            node.attr_count += 1;
        }

        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.link_child(parent_id, node_id);

        if self.root_element.is_none() && parent_id == DOCUMENT_NODE {
            self.root_element = Some(node_id);
        }

        let is_void = self.is_html && VOID_ELEMENTS.contains(&name.as_str());
        if !self_closed && !is_void {
            stack.push(node_id);
        }
    }

    /// Close the nearest open element with this name, along with anything
    /// left open inside it. Unmatched end tags are dropped.
    fn close_element(&mut self, name: &str, stack: &mut Vec<NodeId>) {
        let position = stack
            .iter()
            .rposition(|&id| id != DOCUMENT_NODE && self.node_name(id) == Some(name));
        match position {
            Some(pos) => stack.truncate(pos),
            None => trace!(name, "ignoring unmatched end tag"),
        }
    }

    fn apply_implied_end(&self, opening: &str, stack: &mut Vec<NodeId>) {
        let Some((_, closes)) = IMPLIED_END.iter().find(|(tag, _)| *tag == opening) else {
            return;
        };
        if let Some(&top) = stack.last() {
            if top != DOCUMENT_NODE && self.node_name(top).is_some_and(|n| closes.contains(&n)) {
                stack.pop();
            }
        }
    }

    fn append_leaf(&mut self, stack: &[NodeId], make: impl FnOnce(Option<NodeId>, u16) -> Node) {
        let parent_id = stack.last().copied().unwrap_or(DOCUMENT_NODE);
        let node_id = self.nodes.len() as NodeId;
        let depth = u16::try_from(stack.len()).unwrap_or(u16::MAX);
        self.nodes.push(make(Some(parent_id), depth));
        self.link_child(parent_id, node_id);
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }

    /// First top-level element, if the document has any element at all
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.root_element
    }

    /// Whether the document was built with HTML rules
    pub fn is_html(&self) -> bool {
        self.is_html
    }

    /// Resolve a path expression to the element it denotes
    pub fn select(&self, path: &Path) -> Option<NodeId> {
        crate::path::select(self, path)
    }

    fn attrs_of(&self, id: NodeId) -> &[Attr] {
        match self.get_node(id) {
            Some(node) if node.kind == NodeKind::Element => {
                let start = node.attr_start as usize;
                let end = start + node.attr_count as usize;
                &self.attributes[start..end]
            }
            _ => &[],
        }
    }
}

impl DocumentAccess for Document {
    fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Element | NodeKind::ProcessingInstruction => {
                self.strings.get_str(node.name_id)
            }
            _ => None,
        }
    }

    fn text_content(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.is_text() {
            self.strings.get_str(node.name_id)
        } else {
            None
        }
    }

    fn attribute_pairs(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.attrs_of(id)
            .iter()
            .filter_map(|a| Some((self.strings.get_str(a.name_id)?, self.strings.get_str(a.value_id)?)))
            .collect()
    }

    fn attribute_ids(&self, id: NodeId) -> Vec<(u32, u32)> {
        self.attrs_of(id).iter().map(|a| (a.name_id, a.value_id)).collect()
    }

    fn strings(&self) -> &StringPool {
        &self.strings
    }
}
