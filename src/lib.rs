//! relocate - find a labeled element again in mutated copies of a document
//!
//! Pipeline:
//! 1. Parse the original document into an arena DOM ([`dom::Document`])
//! 2. Locate the labeled element ([`locate::locate`])
//! 3. Snapshot its features ([`fingerprint::Fingerprint`])
//! 4. Score every element of each variant and keep the best
//!    ([`matcher::best_match`], [`matcher::rank`])
//! 5. Report the winner by path ([`path::Path`], [`report::render_line`])
//!
//! Variants can be evaluated on the rayon pool ([`strategy::match_variants`]).
//!
//! ```
//! use relocate::{learn, MatchConfig};
//!
//! let original = br#"<html><body><a id="ok" class="btn">OK</a></body></html>"#;
//! let variant = br#"<html><body><div><a class="btn">OK</a></div></body></html>"#;
//!
//! let fp = learn(original, "ok").unwrap();
//! let reports = relocate::match_variants(&fp, &[variant], &MatchConfig::default()).unwrap();
//! assert_eq!(reports[0].matches[0].path.to_string(), "html/body/div/a");
//! ```

mod core;
pub mod config;
pub mod dom;
pub mod error;
pub mod fingerprint;
pub mod locate;
pub mod matcher;
pub mod path;
pub mod reader;
pub mod report;
pub mod score;
pub mod strategy;

pub use config::{FailurePolicy, MatchConfig, Weights};
pub use dom::{Document, DocumentAccess, NodeId};
pub use error::{MatchError, Result};
pub use fingerprint::Fingerprint;
pub use matcher::{best_match, rank, ScoredMatch};
pub use path::Path;
pub use score::{ScoreBreakdown, Scorer};
pub use strategy::{match_documents, match_loaded, match_variants, VariantReport};

use tracing::debug;

/// Label used when none is given on the command line
pub const DEFAULT_LABEL: &str = "make-everything-ok-button";

/// Parse the original document, locate `label` and fingerprint it. The
/// parsed document is dropped before returning.
pub fn learn(original: &[u8], label: &str) -> Result<Fingerprint> {
    let doc = Document::from_bytes(original)?;
    let node = locate::locate(&doc, label)?;
    let fp = Fingerprint::extract(&doc, node);
    debug!(label, path = %path::resolve(&doc, node), tag = %fp.tag, "reference learned");
    Ok(fp)
}

/// Learn `label` from `original` and match it in every variant
pub fn relocate<V>(original: &[u8], label: &str, variants: &[V], config: &MatchConfig) -> Result<Vec<VariantReport>>
where
    V: AsRef<[u8]> + Sync,
{
    config.validate()?;
    let fp = learn(original, label)?;
    match_variants(&fp, variants, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relocate_pipeline() {
        let original = r#"<html><body><div><button id="buy" class="btn buy">Buy</button></div></body></html>"#;
        let variants = [
            r#"<html><body><div><button class="btn buy-now">Buy</button><button class="btn">Cancel</button></div></body></html>"#,
        ];
        let reports = relocate(original.as_bytes(), "buy", &variants, &MatchConfig::default()).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].matches[0].path.to_string(), "html/body/div/button[1]");
    }

    #[test]
    fn test_relocate_missing_label() {
        let variants: [&str; 0] = [];
        let err = relocate(b"<a/>", "nope", &variants, &MatchConfig::default()).unwrap_err();
        assert_eq!(err, MatchError::NotFound { label: "nope".into() });
    }
}
