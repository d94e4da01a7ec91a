// src/commands.rs
//! Command handlers for the rebundle CLI

use anyhow::Result;
use rebundle::BundleConverter;
use std::path::Path;
use tracing::info;

/// Convert a bundle at `source` into a package under `destination`
pub fn convert(source: &str, destination: &Path) -> Result<()> {
    info!(
        "Converting bundle {} -> {}",
        source,
        destination.display()
    );

    let converter = BundleConverter::new(source, destination);
    converter.convert()?;

    println!("Converted bundle into {}", destination.display());
    Ok(())
}
