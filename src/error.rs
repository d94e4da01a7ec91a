// src/error.rs

//! Error types for bundle conversion

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a bundle
#[derive(Error, Debug)]
pub enum Error {
    /// A source file (plist, JSON, or CSON) could not be parsed
    #[error("Failed to parse '{}': {reason}", .path.display())]
    SourceFormat { path: PathBuf, reason: String },

    /// A scope selector could not be translated to a CSS selector
    #[error("In file '{}' at \"{scope}\": {reason}", .path.display())]
    SelectorTranslation {
        path: PathBuf,
        scope: String,
        reason: String,
    },

    /// Remote bundle archive returned a non-success status
    #[error("Download failed ({status})")]
    Fetch { status: String },

    /// Downloaded archive did not contain a bundle directory
    #[error("Downloaded archive contained no bundle directory")]
    EmptyArchive,

    /// HTTP transport error while fetching a remote bundle
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during read/write/rename
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
