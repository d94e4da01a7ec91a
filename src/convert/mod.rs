// src/convert/mod.rs

//! Bundle to package conversion
//!
//! [`BundleConverter`] drives the whole pipeline: it resolves the bundle's
//! package name and source subdirectories, runs the snippet and preference
//! aggregators and the grammar copier against the destination tree, and
//! normalizes destination filenames afterward. Sources may be a local
//! directory or an `http(s)` URL pointing at a hosted bundle repository.

pub mod grammars;
pub mod preferences;
pub mod snippets;
pub mod writer;

use crate::cson;
use crate::error::Result;
use crate::fetch;
use crate::normalize;
use crate::selector::{ScopeSelector, ScopeTranslator};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Mapping from translated selector to aggregated properties
pub type SelectorGroup = Map<String, Value>;

/// Optional manifest at the bundle root naming the converted package
#[derive(Deserialize)]
struct BundleManifest {
    #[serde(rename = "packageName")]
    package_name: Option<String>,
}

/// Converts a TextMate bundle into a Pulsar package layout
pub struct BundleConverter {
    source: String,
    destination: PathBuf,
    translator: Box<dyn ScopeTranslator>,
}

impl BundleConverter {
    /// Create a converter for `source` (directory path or URL)
    pub fn new(source: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            translator: Box::new(ScopeSelector),
        }
    }

    /// Replace the scope translator (used to stub translation in tests)
    pub fn with_translator(mut self, translator: Box<dyn ScopeTranslator>) -> Self {
        self.translator = translator;
        self
    }

    /// Run the conversion
    pub fn convert(&self) -> Result<()> {
        if fetch::is_remote_source(&self.source) {
            let download = fetch::download_bundle(&self.source)?;
            self.convert_directories(download.bundle_root())
        } else {
            self.convert_directories(Path::new(&self.source))
        }
    }

    fn convert_directories(&self, source: &Path) -> Result<()> {
        let package_name = self.resolve_package_name(source);
        info!(
            "Converting bundle {} into package '{}'",
            source.display(),
            package_name
        );

        self.convert_snippets(&package_name, source)?;
        self.convert_preferences(&package_name, source)?;
        self.convert_grammars(source)?;
        Ok(())
    }

    /// Package display name: `packageName` from the bundle's package.json if
    /// present, else the destination directory's base name
    fn resolve_package_name(&self, source: &Path) -> String {
        let manifest = source.join("package.json");
        if let Ok(text) = fs::read_to_string(&manifest) {
            match serde_json::from_str::<BundleManifest>(&text) {
                Ok(BundleManifest {
                    package_name: Some(name),
                }) => return name,
                Ok(_) => {}
                Err(e) => debug!("Ignoring unreadable {}: {}", manifest.display(), e),
            }
        }
        self.destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string())
    }

    fn convert_snippets(&self, package_name: &str, source: &Path) -> Result<()> {
        let Some(source_dir) = source_subdirectory(source, "snippets", "Snippets") else {
            return Ok(());
        };
        let group = snippets::aggregate_snippets(&source_dir, self.translator.as_ref())?;

        let destination = self.destination.join("snippets");
        writer::write_package_file(&package_file(&destination, package_name), group)?;
        normalize::normalize_filenames(&destination)
    }

    fn convert_preferences(&self, package_name: &str, source: &Path) -> Result<()> {
        let Some(source_dir) = source_subdirectory(source, "preferences", "Preferences") else {
            return Ok(());
        };
        let group = preferences::aggregate_preferences(&source_dir, self.translator.as_ref())?;

        let destination = self.destination.join("settings");
        writer::write_package_file(&package_file(&destination, package_name), group)?;
        normalize::normalize_filenames(&destination)
    }

    fn convert_grammars(&self, source: &Path) -> Result<()> {
        let Some(source_dir) = source_subdirectory(source, "syntaxes", "Syntaxes") else {
            return Ok(());
        };

        let destination = self.destination.join("grammars");
        grammars::copy_grammars(&source_dir, &destination)?;
        normalize::normalize_filenames(&destination)
    }
}

/// Locate a source subdirectory, preferring the lowercase name
fn source_subdirectory(source: &Path, lower: &str, capitalized: &str) -> Option<PathBuf> {
    for name in [lower, capitalized] {
        let candidate = source.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
    }
    None
}

fn package_file(directory: &Path, package_name: &str) -> PathBuf {
    directory.join(format!("{package_name}.{}", cson::EXTENSION))
}
