//! Candidate selection
//!
//! Walks every element of a variant document in document order, scores it
//! against the fingerprint and keeps the best. Exact ties keep the earliest
//! element, so results are deterministic for a given pair of inputs.

use crate::config::MatchConfig;
use crate::dom::{DocumentAccess, NodeId, DOCUMENT_NODE};
use crate::error::{MatchError, Result};
use crate::fingerprint::Fingerprint;
use crate::path::{resolve, Path};
use crate::score::{ScoreBreakdown, Scorer};
use serde::Serialize;
use tracing::{debug, trace};

/// A located candidate and its similarity to the reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    #[serde(skip)]
    pub node: NodeId,
    pub path: Path,
    pub score: f64,
    /// Per-feature scores, present when explanations were requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

/// Best-scoring element of `doc`. Fails with [`MatchError::EmptyTree`] when
/// the document has no element.
pub fn best_match<D: DocumentAccess>(
    fp: &Fingerprint,
    doc: &D,
    config: &MatchConfig,
) -> Result<ScoredMatch> {
    let mut scorer = Scorer::new(fp, doc, &config.weights, config.token_cache_capacity);
    let mut best: Option<(NodeId, ScoreBreakdown)> = None;

    for id in doc.descendants(DOCUMENT_NODE).filter(|&id| doc.is_element(id)) {
        let breakdown = scorer.explain(id);
        trace!(node = id, score = breakdown.total, "candidate scored");
        // Strict comparison: the first of equally scored elements wins
        if best.as_ref().is_none_or(|(_, b)| breakdown.total > b.total) {
            best = Some((id, breakdown));
        }
    }

    let (node, breakdown) = best.ok_or(MatchError::EmptyTree)?;
    let found = to_match(doc, node, breakdown, config.explain);
    debug!(path = %found.path, score = found.score, "best match");
    Ok(found)
}

/// Elements of `doc` scoring at least `config.threshold`, best first, at
/// most `config.limit` of them. Equal scores stay in document order.
pub fn rank<D: DocumentAccess>(
    fp: &Fingerprint,
    doc: &D,
    config: &MatchConfig,
) -> Result<Vec<ScoredMatch>> {
    let mut scorer = Scorer::new(fp, doc, &config.weights, config.token_cache_capacity);
    let mut seen_any = false;
    let mut scored: Vec<(NodeId, ScoreBreakdown)> = Vec::new();

    for id in doc.descendants(DOCUMENT_NODE).filter(|&id| doc.is_element(id)) {
        seen_any = true;
        let breakdown = scorer.explain(id);
        trace!(node = id, score = breakdown.total, "candidate scored");
        if breakdown.total >= config.threshold {
            scored.push((id, breakdown));
        }
    }

    if !seen_any {
        return Err(MatchError::EmptyTree);
    }

    // sort_by is stable, so document order breaks ties
    scored.sort_by(|a, b| b.1.total.total_cmp(&a.1.total));
    scored.truncate(config.limit);

    debug!(kept = scored.len(), threshold = config.threshold, "candidates ranked");
    Ok(scored
        .into_iter()
        .map(|(node, breakdown)| to_match(doc, node, breakdown, config.explain))
        .collect())
}

fn to_match<D: DocumentAccess>(doc: &D, node: NodeId, breakdown: ScoreBreakdown, explain: bool) -> ScoredMatch {
    ScoredMatch {
        node,
        path: resolve(doc, node),
        score: breakdown.total,
        breakdown: explain.then_some(breakdown),
    }
}
