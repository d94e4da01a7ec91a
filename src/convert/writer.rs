// src/convert/writer.rs

//! Package file serialization
//!
//! The final step of every conversion pass: strip source-format-internal
//! keys, suppress empty output, serialize to CSON. Existing files are
//! overwritten unconditionally since each run fully regenerates its output.

use crate::cson;
use crate::error::Result;
use crate::source::RawRecord;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Source-format-internal keys with no meaning in the target format
const OPAQUE_KEYS: [&str; 2] = ["uuid", "keyEquivalent"];

/// Write `record` to `path` as CSON
///
/// Returns whether a file was written; an empty record (after opaque-key
/// stripping) produces no file. The parent directory is created on demand so
/// destination subdirectories only appear when they receive content.
pub fn write_package_file(path: &Path, mut record: RawRecord) -> Result<bool> {
    for key in OPAQUE_KEYS {
        record.remove(key);
    }
    if record.is_empty() {
        debug!("Skipping empty output file {}", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, cson::to_string(&serde_json::Value::Object(record)))?;
    Ok(true)
}
