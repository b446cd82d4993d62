//! Match configuration
//!
//! Every tunable of the scorer and the batch runner lives here, with
//! defaults that reproduce the reference weighting.

use crate::error::{MatchError, Result};
use serde::{Deserialize, Serialize};

/// Relative weights and scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Tag equality
    pub tag: f64,
    /// Attribute similarity
    pub attributes: f64,
    /// Direct text similarity
    pub text: f64,
    /// Ancestor chain and sibling shape
    pub structure: f64,
    /// Credit for an attribute whose value differs but shares a token
    pub partial_credit: f64,
    /// Minimum length of a token that counts as shared
    pub min_token_len: usize,
    /// Share of the structural score taken by the ancestor chain; the
    /// remainder goes to the sibling multiset
    pub ancestor_share: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            tag: 0.25,
            attributes: 0.35,
            text: 0.15,
            structure: 0.25,
            partial_credit: 0.5,
            min_token_len: 3,
            ancestor_share: 0.6,
        }
    }
}

impl Weights {
    /// Sum of the four feature weights, in scoring order
    pub fn total(&self) -> f64 {
        self.tag + self.attributes + self.text + self.structure
    }

    pub fn validate(&self) -> Result<()> {
        let features = [
            ("tag", self.tag),
            ("attributes", self.attributes),
            ("text", self.text),
            ("structure", self.structure),
        ];
        for (name, value) in features {
            if !value.is_finite() || value < 0.0 {
                return Err(MatchError::InvalidConfig(format!(
                    "weight '{name}' must be a non-negative number, got {value}"
                )));
            }
        }
        if self.total() <= 0.0 {
            return Err(MatchError::InvalidConfig(
                "feature weights must not all be zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.partial_credit) {
            return Err(MatchError::InvalidConfig(
                "partial_credit must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ancestor_share) {
            return Err(MatchError::InvalidConfig(
                "ancestor_share must be between 0.0 and 1.0".into(),
            ));
        }
        if self.min_token_len == 0 {
            return Err(MatchError::InvalidConfig(
                "min_token_len must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// What to do when one variant of a batch fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing variant
    #[default]
    Abort,
    /// Log the failure and carry on with the next variant
    Skip,
}

impl std::str::FromStr for FailurePolicy {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            other => Err(MatchError::InvalidConfig(format!(
                "unknown failure policy '{other}' (expected 'abort' or 'skip')"
            ))),
        }
    }
}

/// Configuration for a relocation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default)]
    pub weights: Weights,
    /// Number of ranked candidates reported per variant
    #[serde(default = "MatchConfig::default_limit")]
    pub limit: usize,
    /// Candidates scoring below this are not reported
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Evaluate variants on the rayon pool
    #[serde(default)]
    pub parallel: bool,
    /// Entries kept in the per-variant token cache
    #[serde(default = "MatchConfig::default_token_cache_capacity")]
    pub token_cache_capacity: usize,
    /// Attach per-feature scores to every reported match
    #[serde(default)]
    pub explain: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            weights: Weights::default(),
            limit: Self::default_limit(),
            threshold: 0.0,
            failure_policy: FailurePolicy::default(),
            parallel: false,
            token_cache_capacity: Self::default_token_cache_capacity(),
            explain: false,
        }
    }
}

impl MatchConfig {
    pub(crate) fn default_limit() -> usize {
        1
    }

    pub(crate) fn default_token_cache_capacity() -> usize {
        4096
    }

    /// Validate every field, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.limit == 0 {
            return Err(MatchError::InvalidConfig(
                "limit must be greater than zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(MatchError::InvalidConfig(
                "threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.token_cache_capacity == 0 {
            return Err(MatchError::InvalidConfig(
                "token_cache_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
