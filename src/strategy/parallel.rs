//! Parallel Variant Matching
//!
//! Uses Rayon to evaluate variants concurrently. Each variant gets its own
//! scorer and token cache; the fingerprint is shared read-only.

use crate::config::{FailurePolicy, MatchConfig};
use crate::dom::{DocumentAccess, Document};
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::matcher::{rank, ScoredMatch};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Matches found in one variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantReport {
    /// Position of the variant in the input
    pub index: usize,
    pub matches: Vec<ScoredMatch>,
}

/// Parse and match raw variant documents
pub fn match_variants<V>(fp: &Fingerprint, variants: &[V], config: &MatchConfig) -> Result<Vec<VariantReport>>
where
    V: AsRef<[u8]> + Sync,
{
    run(variants.len(), config, |index| {
        let doc = Document::from_bytes(variants[index].as_ref())?;
        rank(fp, &doc, config)
    })
}

/// Parse and match variants whose loading may already have failed. A failed
/// load is that variant's outcome and goes through the failure policy like
/// any other variant error.
pub fn match_loaded<V>(fp: &Fingerprint, variants: &[Result<V>], config: &MatchConfig) -> Result<Vec<VariantReport>>
where
    V: AsRef<[u8]> + Sync,
{
    run(variants.len(), config, |index| {
        let bytes = variants[index].as_ref().map_err(Clone::clone)?;
        let doc = Document::from_bytes(bytes.as_ref())?;
        rank(fp, &doc, config)
    })
}

/// Match already parsed documents
pub fn match_documents<D>(fp: &Fingerprint, docs: &[D], config: &MatchConfig) -> Result<Vec<VariantReport>>
where
    D: DocumentAccess + Sync,
{
    run(docs.len(), config, |index| rank(fp, &docs[index], config))
}

fn run<F>(count: usize, config: &MatchConfig, task: F) -> Result<Vec<VariantReport>>
where
    F: Fn(usize) -> Result<Vec<ScoredMatch>> + Sync,
{
    config.validate()?;
    debug!(variants = count, parallel = config.parallel, "matching variants");

    let outcomes: Vec<Result<Vec<ScoredMatch>>> = if config.parallel {
        (0..count).into_par_iter().map(&task).collect()
    } else {
        let mut outcomes = Vec::with_capacity(count);
        for index in 0..count {
            let outcome = task(index);
            let failed = outcome.is_err();
            outcomes.push(outcome);
            // Sequential aborts stop early; later variants are never read
            if failed && config.failure_policy == FailurePolicy::Abort {
                break;
            }
        }
        outcomes
    };

    let mut reports = Vec::with_capacity(outcomes.len());
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(matches) => reports.push(VariantReport { index, matches }),
            Err(err) => match config.failure_policy {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::Skip => warn!(variant = index, error = %err, "skipping variant"),
            },
        }
    }
    Ok(reports)
}
