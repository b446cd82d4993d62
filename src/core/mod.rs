//! Core markup scanning primitives
//!
//! This module contains the building blocks the reader is made of:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: Lenient state machine for markup token extraction
//! - Entities: Entity decoding with Cow (zero-copy when possible)
//! - Attributes: Attribute parsing, including HTML boolean and unquoted forms

pub mod attributes;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
