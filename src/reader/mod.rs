//! Markup Reader Module
//!
//! - SliceReader: Zero-copy pull reader over a byte slice
//! - Events: event types produced by the reader and consumed by the DOM builder

pub mod events;
pub mod slice;

pub use events::{EndElement, MarkupEvent, StartElement};
pub use slice::SliceReader;
