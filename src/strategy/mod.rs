//! Batch Strategy Module
//!
//! Runs one fingerprint against many variant documents, either sequentially
//! or spread over the rayon thread pool. Both paths return results in input
//! order.

pub mod parallel;

pub use parallel::{match_documents, match_loaded, match_variants, VariantReport};
