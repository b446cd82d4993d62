//! Report rendering
//!
//! Text reports are one `'<path>' (score=<float>)` line per match. The score
//! is printed with its shortest round-trip form and always keeps a
//! fractional part (`1.0`, never `1`).

use crate::matcher::ScoredMatch;
use crate::path::Path;
use crate::score::ScoreBreakdown;
use serde::Serialize;

/// Output format of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// `'<path>' (score=<float>)`
pub fn render_line(found: &ScoredMatch) -> String {
    format!("'{}' (score={:?})", found.path, found.score)
}

/// Indented per-feature scores, for `--explain` text output
pub fn render_breakdown(breakdown: &ScoreBreakdown) -> String {
    format!(
        "    tag={:?} attributes={:?} text={:?} structure={:?}",
        breakdown.tag, breakdown.attributes, breakdown.text, breakdown.structure
    )
}

#[derive(Serialize)]
struct Record<'a> {
    variant: &'a str,
    rank: usize,
    path: &'a Path,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<&'a ScoreBreakdown>,
}

/// One JSON object describing the `rank`-th (1-based) match of a variant
pub fn render_json(variant: &str, rank: usize, found: &ScoredMatch) -> serde_json::Result<String> {
    serde_json::to_string(&Record {
        variant,
        rank,
        path: &found.path,
        score: found.score,
        breakdown: found.breakdown.as_ref(),
    })
}

/// Render all matches of one variant in the requested format
pub fn render_variant(variant: &str, matches: &[ScoredMatch], format: Format) -> serde_json::Result<Vec<String>> {
    let mut lines = Vec::new();
    for (i, found) in matches.iter().enumerate() {
        match format {
            Format::Text => {
                lines.push(render_line(found));
                if let Some(breakdown) = &found.breakdown {
                    lines.push(render_breakdown(breakdown));
                }
            }
            Format::Json => lines.push(render_json(variant, i + 1, found)?),
        }
    }
    Ok(lines)
}
