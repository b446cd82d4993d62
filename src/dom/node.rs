//! Arena node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references. Parent and
//! sibling links are plain indices into the arena, never owning edges.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// The document node always occupies the first arena slot
pub const DOCUMENT_NODE: NodeId = 0;

/// Type of node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Type of this node
    pub kind: NodeKind,
    /// Parent node (None for the document node)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Index into string pool for name (elements, PIs) or content (text, comments)
    pub name_id: u32,
    /// Start of attributes in attribute arena (for elements)
    pub attr_start: u32,
    /// Number of attributes
    pub attr_count: u16,
    /// Depth in document tree (document node is 0, top-level elements are 1)
    pub depth: u16,
}

impl Node {
    fn with_kind(kind: NodeKind, name_id: u32, parent: Option<NodeId>, depth: u16) -> Self {
        Node {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id,
            attr_start: 0,
            attr_count: 0,
            depth,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::with_kind(NodeKind::Document, 0, None, 0)
    }

    /// Create a new element node
    pub fn element(name_id: u32, parent: Option<NodeId>, depth: u16) -> Self {
        Self::with_kind(NodeKind::Element, name_id, parent, depth)
    }

    /// Create a new text node
    pub fn text(content_id: u32, parent: Option<NodeId>, depth: u16) -> Self {
        Self::with_kind(NodeKind::Text, content_id, parent, depth)
    }

    /// Create a new CDATA node
    pub fn cdata(content_id: u32, parent: Option<NodeId>, depth: u16) -> Self {
        Self::with_kind(NodeKind::CData, content_id, parent, depth)
    }

    /// Create a new comment node
    pub fn comment(content_id: u32, parent: Option<NodeId>, depth: u16) -> Self {
        Self::with_kind(NodeKind::Comment, content_id, parent, depth)
    }

    /// Create a processing instruction node
    pub fn processing_instruction(target_id: u32, parent: Option<NodeId>, depth: u16) -> Self {
        Self::with_kind(NodeKind::ProcessingInstruction, target_id, parent, depth)
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this node carries character data (text or CDATA)
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::CData)
    }
}

/// Stored attribute
#[derive(Debug, Clone, Copy)]
pub struct Attr {
    /// Index into string pool for attribute name
    pub name_id: u32,
    /// Index into string pool for attribute value
    pub value_id: u32,
}

impl Attr {
    pub fn new(name_id: u32, value_id: u32) -> Self {
        Attr { name_id, value_id }
    }
}
