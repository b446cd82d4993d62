//! Error types for the relocation pipeline.
//!
//! Every variant is an input-data condition rather than a transient fault,
//! so nothing here is retried. Callers decide whether a failing variant stops
//! the run or is skipped (see [`FailurePolicy`](crate::config::FailurePolicy)).

use thiserror::Error;

/// Errors raised while parsing, locating, or matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchError {
    /// The label denotes no node in the original document.
    #[error("no element in the original document matches label '{label}'")]
    NotFound { label: String },

    /// The label denotes more than one node in the original document.
    #[error("label '{label}' is ambiguous: {count} elements match it")]
    AmbiguousLabel { label: String, count: usize },

    /// A variant document contains no element to evaluate.
    #[error("document contains no elements")]
    EmptyTree,

    /// The input could not be turned into a tree.
    #[error("failed to parse document: {0}")]
    ParseFailure(String),

    /// A variant could not be read from its source.
    #[error("failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Shorthand used throughout the crate.
pub type Result<T, E = MatchError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = MatchError::NotFound { label: "ok-button".into() };
        assert!(err.to_string().contains("ok-button"));

        let err = MatchError::AmbiguousLabel { label: "btn".into(), count: 3 };
        assert_eq!(err.to_string(), "label 'btn' is ambiguous: 3 elements match it");

        assert_eq!(MatchError::EmptyTree.to_string(), "document contains no elements");

        let err = MatchError::Unreadable { path: "gone.html".into(), reason: "No such file".into() };
        assert_eq!(err.to_string(), "failed to read gone.html: No such file");
    }
}
