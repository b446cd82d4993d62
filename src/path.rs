//! Path expressions
//!
//! A path names an element by the chain of (tag, position) steps leading to
//! it from the top of the tree, e.g. `html/body/div[2]/a`. Positions are
//! 1-based and count only earlier siblings with the same tag. The position is
//! left implicit only when no sibling shares the tag, so the first of several
//! `a` siblings renders as `a[1]`, the way lxml `getelementpath` writes it.

use crate::dom::{DocumentAccess, NodeId, DOCUMENT_NODE};
use crate::error::MatchError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One location step: tag plus 1-based position among same-tag siblings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step {
    pub tag: String,
    pub index: usize,
    /// Another sibling shares the tag, so the index is always rendered
    pub repeated: bool,
}

impl Step {
    /// Step whose index is rendered only past the first position
    pub fn new(tag: impl Into<String>, index: usize) -> Self {
        Step { tag: tag.into(), index, repeated: index > 1 }
    }

    /// Step whose index is always rendered
    pub fn indexed(tag: impl Into<String>, index: usize) -> Self {
        Step { tag: tag.into(), index, repeated: true }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repeated || self.index > 1 {
            write!(f, "{}[{}]", self.tag, self.index)
        } else {
            f.write_str(&self.tag)
        }
    }
}

/// A location path from the top-level element down to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    pub fn new(steps: Vec<Step>) -> Self {
        Path { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Path {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(MatchError::ParseFailure("empty path".into()));
        }

        let steps = trimmed
            .split('/')
            .map(parse_step)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Path { steps })
    }
}

fn parse_step(raw: &str) -> Result<Step, MatchError> {
    let bad = || MatchError::ParseFailure(format!("invalid path step '{raw}'"));

    let (tag, index, explicit) = match raw.find('[') {
        Some(open) => {
            let rest = raw[open + 1..].strip_suffix(']').ok_or_else(bad)?;
            let index: usize = rest.parse().map_err(|_| bad())?;
            (&raw[..open], index, true)
        }
        None => (raw, 1, false),
    };

    if tag.is_empty() || index == 0 {
        return Err(bad());
    }
    Ok(if explicit { Step::indexed(tag, index) } else { Step::new(tag, index) })
}

/// Compute the path of an element. Non-element nodes resolve to the path of
/// their nearest element ancestor.
pub fn resolve<D: DocumentAccess>(doc: &D, node: NodeId) -> Path {
    let mut chain = doc.element_ancestors(node);
    if doc.is_element(node) {
        chain.push(node);
    }

    let steps = chain
        .into_iter()
        .map(|id| {
            let tag = doc.node_name(id).unwrap_or_default();
            let (index, later) = same_tag_position(doc, id, tag);
            Step { tag: tag.to_string(), index, repeated: index > 1 || later }
        })
        .collect();
    Path { steps }
}

/// 1-based position of `id` among its same-tag element siblings, and whether
/// any later sibling shares the tag
fn same_tag_position<D: DocumentAccess>(doc: &D, id: NodeId, tag: &str) -> (usize, bool) {
    let same_tag = |sid: NodeId| doc.is_element(sid) && doc.node_name(sid) == Some(tag);

    let mut position = 1;
    let mut sibling = doc.prev_sibling_of(id);
    while let Some(sid) = sibling {
        if same_tag(sid) {
            position += 1;
        }
        sibling = doc.prev_sibling_of(sid);
    }

    let mut later = false;
    let mut sibling = doc.next_sibling_of(id);
    while let Some(sid) = sibling {
        if same_tag(sid) {
            later = true;
            break;
        }
        sibling = doc.next_sibling_of(sid);
    }
    (position, later)
}

/// Follow a path from the document node. Returns `None` when any step has no
/// matching element.
pub fn select<D: DocumentAccess>(doc: &D, path: &Path) -> Option<NodeId> {
    if path.is_empty() {
        return None;
    }

    let mut current = DOCUMENT_NODE;
    for step in &path.steps {
        current = doc
            .element_children(current)
            .into_iter()
            .filter(|&c| doc.node_name(c) == Some(step.tag.as_str()))
            .nth(step.index - 1)?;
    }
    Some(current)
}
