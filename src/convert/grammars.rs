// src/convert/grammars.rs

//! Grammar recoding
//!
//! Syntax grammars keep their structure; they are only re-serialized to the
//! target notation, one output file per source file. Output names are the
//! lowercased source stem with the target extension.

use crate::cson;
use crate::error::Result;
use crate::source;
use std::path::Path;
use tracing::debug;

use super::writer;

/// Recode every grammar file under `source_dir` into `destination_dir`
pub fn copy_grammars(source_dir: &Path, destination_dir: &Path) -> Result<()> {
    for path in source::sorted_entries(source_dir)? {
        if !path.is_file() {
            continue;
        }
        let Some(record) = source::read_record(&path)? else {
            debug!("Skipping unrecognized grammar file: {}", path.display());
            continue;
        };

        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()) else {
            continue;
        };
        let destination = destination_dir.join(format!("{stem}.{}", cson::EXTENSION));
        writer::write_package_file(&destination, record)?;
    }
    Ok(())
}
