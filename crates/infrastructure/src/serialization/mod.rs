//! Deterministic JSON serialization for the credentials file.
//!
//! Output is stable across writes:
//! - Struct fields in declaration order
//! - 2-space indentation
//! - Trailing newline
//! - UTF-8 encoding without BOM

mod json;

pub use json::*;
