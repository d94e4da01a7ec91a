// src/normalize.rs

//! Destination filename normalization
//!
//! Converted bundles carry filenames that are legal on the source platform
//! but not everywhere (`Operator | Pipe.cson`, `What?.cson`). Every entry in
//! a destination directory is renamed to a cross-platform-safe form, with
//! numeric suffixes resolving collisions. Uniqueness is checked
//! case-insensitively because the target filesystem may be either.

use crate::error::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Characters forbidden on at least one major filesystem
static FORBIDDEN_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[|?*<>:"\\/]+"#).unwrap());

static WHITESPACE_AND_HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+").unwrap());

/// Rename every entry of `directory` to a sanitized, collision-free name
///
/// Entries whose names are already clean are left untouched, so running the
/// pass twice over an unchanged directory is a no-op. A `directory` that is
/// not a directory at all is also a no-op.
pub fn normalize_filenames(directory: &Path) -> Result<()> {
    if !directory.is_dir() {
        return Ok(());
    }

    // Sorted for reproducible collision-suffix assignment
    let mut names: Vec<String> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();

    for name in names {
        let replaced = FORBIDDEN_CHARACTERS.replace_all(&name, "-");
        if replaced == name {
            continue;
        }
        let mut converted = WHITESPACE_AND_HYPHENS
            .replace_all(&replaced, "-")
            .into_owned();

        let mut suffix = 1;
        while name_taken(directory, &converted)? {
            let (stem, extension) = split_extension(&converted);
            converted = format!("{stem}-{suffix}{extension}");
            suffix += 1;
        }

        fs::rename(directory.join(&name), directory.join(&converted))?;
    }

    Ok(())
}

/// Check whether `candidate` is taken, case-sensitively or -insensitively
fn name_taken(directory: &Path, candidate: &str) -> Result<bool> {
    if directory.join(candidate).exists() {
        return Ok(true);
    }
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry
            .file_name()
            .to_string_lossy()
            .eq_ignore_ascii_case(candidate)
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Split `name` into stem and extension (extension keeps its leading dot)
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        // A leading dot is a hidden file, not an extension
        Some(index) if index > 0 => name.split_at(index),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_forbidden_characters_become_hyphens() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Foo:Bar.cson");

        normalize_filenames(dir.path()).unwrap();
        assert_eq!(listing(dir.path()), vec!["Foo-Bar.cson"]);
    }

    #[test]
    fn test_runs_collapse_to_single_hyphen() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a | b?.cson");

        normalize_filenames(dir.path()).unwrap();
        assert_eq!(listing(dir.path()), vec!["a-b-.cson"]);
    }

    #[test]
    fn test_idempotent() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Foo:Bar.cson");

        normalize_filenames(dir.path()).unwrap();
        let first = listing(dir.path());
        normalize_filenames(dir.path()).unwrap();
        assert_eq!(listing(dir.path()), first);
    }

    #[test]
    fn test_collision_gets_numeric_suffix() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a-.cson");
        touch(dir.path(), "a*.cson");

        normalize_filenames(dir.path()).unwrap();
        let names = listing(dir.path());
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a-.cson".to_string()));
        assert!(names.contains(&"a--1.cson".to_string()));
    }

    #[test]
    fn test_collision_never_overwrites() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.cson");
        touch(dir.path(), "a*.cson");

        normalize_filenames(dir.path()).unwrap();
        let names = listing(dir.path());
        assert_eq!(names.len(), 2, "one entry clobbered the other: {names:?}");
        assert!(names.contains(&"a.cson".to_string()));
    }

    #[test]
    fn test_collision_check_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "foo-bar.cson");
        touch(dir.path(), "Foo:Bar.cson");

        normalize_filenames(dir.path()).unwrap();
        let names = listing(dir.path());
        assert!(names.contains(&"foo-bar.cson".to_string()));
        assert!(names.contains(&"Foo-Bar-1.cson".to_string()));
    }

    #[test]
    fn test_missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not-there");
        assert!(normalize_filenames(&missing).is_ok());

        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        assert!(normalize_filenames(&file).is_ok());
    }
}
