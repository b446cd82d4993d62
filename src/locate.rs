//! Reference locator
//!
//! Finds the single element in the original document that a label denotes.
//! Candidates are searched in tiers, strictest first, and the first tier
//! with any hit decides:
//!
//! 1. an attribute value containing the label as a whitespace-separated token
//!    (a value equal to the label is the one-token case)
//! 2. an attribute value containing the label anywhere
//! 3. the element's direct text containing the label as a whitespace token

use crate::dom::{DocumentAccess, NodeId};
use crate::error::{MatchError, Result};
use tracing::debug;

type Tier = fn(&str, &str) -> bool;

const ATTRIBUTE_TIERS: [(&str, Tier); 2] = [
    ("attribute token", |value, label| value.split_whitespace().any(|t| t == label)),
    ("attribute substring", |value, label| value.contains(label)),
];

/// Find the element denoted by `label`
pub fn locate<D: DocumentAccess>(doc: &D, label: &str) -> Result<NodeId> {
    let label = label.trim();
    if label.is_empty() {
        return Err(MatchError::NotFound { label: label.to_string() });
    }

    let elements = doc.elements();

    for (tier, test) in ATTRIBUTE_TIERS {
        let hits: Vec<NodeId> = elements
            .iter()
            .copied()
            .filter(|&id| doc.attribute_pairs(id).iter().any(|(_, v)| test(v, label)))
            .collect();
        if let Some(found) = decide(hits, label, tier)? {
            return Ok(found);
        }
    }

    let hits: Vec<NodeId> = elements
        .iter()
        .copied()
        .filter(|&id| doc.direct_text(id).split_whitespace().any(|t| t == label))
        .collect();
    if let Some(found) = decide(hits, label, "text token")? {
        return Ok(found);
    }

    Err(MatchError::NotFound { label: label.to_string() })
}

fn decide(hits: Vec<NodeId>, label: &str, tier: &str) -> Result<Option<NodeId>> {
    match hits.as_slice() {
        [] => Ok(None),
        [only] => {
            debug!(label, tier, node = only, "label located");
            Ok(Some(*only))
        }
        _ => Err(MatchError::AmbiguousLabel {
            label: label.to_string(),
            count: hits.len(),
        }),
    }
}
