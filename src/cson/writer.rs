// src/cson/writer.rs

//! Deterministic CSON serialization
//!
//! Objects render as indentation blocks, matching the layout Pulsar package
//! files use by convention: quoted-when-needed keys, two-space indents,
//! arrays one element per line, multiline strings as triple-quoted blocks.
//! Map entries serialize in insertion order.

use serde_json::Value;

const INDENT: &str = "  ";

/// Serialize a value as a CSON document
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) if !map.is_empty() => write_block(&mut out, map, 0),
        other => {
            write_inline(&mut out, other);
            out.push('\n');
        }
    }
    out
}

fn write_block(out: &mut String, map: &serde_json::Map<String, Value>, depth: usize) {
    for (key, value) in map {
        push_indent(out, depth);
        out.push_str(&format_key(key));
        out.push(':');
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                out.push('\n');
                write_block(out, nested, depth + 1);
            }
            Value::Array(items) if !items.is_empty() => {
                out.push_str(" [\n");
                for item in items {
                    push_indent(out, depth + 1);
                    write_inline(out, item);
                    out.push('\n');
                }
                push_indent(out, depth);
                out.push_str("]\n");
            }
            Value::String(s) if heredoc_eligible(s) => {
                write_heredoc(out, s, depth);
            }
            other => {
                out.push(' ');
                write_inline(out, other);
                out.push('\n');
            }
        }
    }
}

/// Single-line rendering, used for array elements and scalar values
///
/// Compact JSON is valid CSON for any nested structure.
fn write_inline(out: &mut String, value: &Value) {
    out.push_str(&serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()));
}

/// Triple-quoted block strings round-trip only when every line is flush left
/// and the string has no framing newlines
fn heredoc_eligible(s: &str) -> bool {
    s.contains('\n')
        && !s.contains("\"\"\"")
        && !s.starts_with('\n')
        && !s.ends_with('\n')
        && s.lines().all(|line| !line.starts_with([' ', '\t']))
}

fn write_heredoc(out: &mut String, s: &str, depth: usize) {
    out.push_str(" \"\"\"\n");
    for line in s.split('\n') {
        if !line.is_empty() {
            push_indent(out, depth + 1);
            out.push_str(&line.replace('\\', "\\\\"));
        }
        out.push('\n');
    }
    push_indent(out, depth);
    out.push_str("\"\"\"\n");
}

fn format_key(key: &str) -> String {
    let identifier = !key.is_empty()
        && key
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        key.to_string()
    } else {
        serde_json::to_string(key).unwrap_or_else(|_| format!("\"{key}\""))
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
