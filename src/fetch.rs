// src/fetch.rs

//! Remote bundle download
//!
//! Bundles hosted on a Git forge are fetched as a gzipped tarball of the
//! default branch and extracted into a temporary directory before the
//! synchronous conversion pipeline runs. A non-success response aborts the
//! conversion before anything is written; partially extracted content is
//! discarded with the temporary directory.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tar::Archive;
use tempfile::TempDir;
use tracing::info;

/// Whether the conversion source is a URL rather than a local directory
pub fn is_remote_source(source: &str) -> bool {
    url::Url::parse(source)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Derive the archive URL for a hosted bundle repository
///
/// Trailing slashes and an optional `.git` suffix are trimmed before the
/// archive path is appended.
pub fn archive_url(source: &str) -> String {
    let trimmed = source.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');
    format!("{trimmed}/archive/master.tar.gz")
}

/// An extracted remote bundle
///
/// The temporary extraction directory lives as long as this value, so keep it
/// alive for the duration of the conversion.
pub struct DownloadedBundle {
    _extraction_dir: TempDir,
    root: PathBuf,
}

impl DownloadedBundle {
    /// The bundle directory inside the extracted archive
    pub fn bundle_root(&self) -> &Path {
        &self.root
    }
}

/// Download and extract the bundle repository at `source`
pub fn download_bundle(source: &str) -> Result<DownloadedBundle> {
    let url = archive_url(source);
    info!("Downloading bundle archive from {}", url);

    let response = reqwest::blocking::get(url.as_str())?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Fetch {
            status: status.to_string(),
        });
    }

    let extraction_dir = tempfile::Builder::new().prefix("bundle-").tempdir()?;
    let mut archive = Archive::new(GzDecoder::new(response));
    archive.unpack(extraction_dir.path())?;

    // Forge archives wrap the repository in a single top-level directory
    let root = first_directory(extraction_dir.path())?.ok_or(Error::EmptyArchive)?;
    Ok(DownloadedBundle {
        _extraction_dir: extraction_dir,
        root,
    })
}

fn first_directory(path: &Path) -> Result<Option<PathBuf>> {
    let mut directories: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    directories.sort();
    Ok(directories.into_iter().next())
}
