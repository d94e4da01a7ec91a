// src/source.rs

//! Source file reading
//!
//! A bundle stores its records in three notations: Apple property lists (the
//! `.plist` and `.tm*` family), JSON, and CSON. Each file parses into a
//! generic string-keyed mapping; the aggregators pull whatever keys they
//! recognize out of it. Files with unrecognized extensions yield no record.

use crate::cson;
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Extensions parsed as property lists
pub const PLIST_EXTENSIONS: [&str; 6] = [
    "plist",
    "tmCommand",
    "tmLanguage",
    "tmMacro",
    "tmPreferences",
    "tmSnippet",
];

/// A single parsed source record
pub type RawRecord = Map<String, Value>;

/// Read one source file into a generic record
///
/// Returns `Ok(None)` for files whose extension is not a recognized source
/// format; malformed content in a recognized format is an error carrying the
/// offending path.
pub fn read_record(path: &Path) -> Result<Option<RawRecord>> {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return Ok(None);
    };

    let value = if PLIST_EXTENSIONS.contains(&extension) {
        plist::from_file::<_, Value>(path).map_err(|e| Error::SourceFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else if extension == "json" {
        serde_json::from_str(&fs::read_to_string(path)?).map_err(|e| Error::SourceFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else if extension == "cson" {
        cson::from_str(&fs::read_to_string(path)?).map_err(|e| Error::SourceFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else {
        return Ok(None);
    };

    match value {
        Value::Object(record) => Ok(Some(record)),
        _ => Err(Error::SourceFormat {
            path: path.to_path_buf(),
            reason: "expected a top-level mapping".to_string(),
        }),
    }
}

/// List a directory's files in sorted order
///
/// Sorting makes aggregation conflict resolution reproducible instead of
/// depending on filesystem enumeration order.
pub fn sorted_entries(directory: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut entries: Vec<_> = fs::read_dir(directory)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries)
}
