// src/cson/mod.rs

//! Reader and writer for the CSON object notation
//!
//! The target package format serializes snippets, settings, and grammars as
//! CSON: indentation-structured objects with `#` comments, optional-quote
//! keys, and triple-quoted multiline strings. No maintained crate covers the
//! notation, so this module carries its own reader and writer over
//! `serde_json::Value`.
//!
//! The reader accepts the dialect found in published packages (and everything
//! the writer emits): indentation blocks, inline `{}`/`[]` forms, single-,
//! double-, and triple-quoted strings, numbers, booleans (including the
//! `yes`/`no`/`on`/`off` spellings), and `null`.

mod parser;
mod writer;

pub use parser::{from_str, ParseError};
pub use writer::to_string;

/// File extension used for serialized output
pub const EXTENSION: &str = "cson";
