//! Scratch directory lifecycle: create it, and purge archives before and after a run.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::url_model::{ArchiveLink, ARCHIVE_EXTENSION};

/// Create the scratch directory (and parents) if it does not exist.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create scratch directory {}", dir.display()))?;
    tracing::info!("Using download folder: {}", dir.display());
    Ok(())
}

/// Where `link` is downloaded to inside `dir`.
pub fn scratch_path(dir: &Path, link: &ArchiveLink) -> PathBuf {
    dir.join(link.file_name())
}

/// `.7z` in any case, compared on the raw name so non-UTF-8 names still match.
fn is_archive_name(name: &OsStr) -> bool {
    let name = name.as_encoded_bytes();
    let ext = ARCHIVE_EXTENSION.as_bytes();
    name.len() >= ext.len() && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext)
}

/// Delete every `.7z` file (any case) directly inside `dir`.
///
/// Individual delete failures are logged and skipped; only an unreadable
/// directory is an error. Returns the number of files removed.
pub fn purge_archives(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;

    let mut removed = 0;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        if !is_archive_name(&file_name) {
            continue;
        }
        let name = file_name.to_string_lossy();
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::info!("Deleted old file: {}", name);
                removed += 1;
            }
            Err(e) => tracing::error!("Could not delete {}: {}", name, e),
        }
    }
    Ok(removed)
}

/// Number of `.7z` files currently in `dir`.
pub fn count_archives(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| is_archive_name(&e.file_name()))
                .count()
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_removes_only_archives() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.7z"), b"x").unwrap();
        fs::write(dir.path().join("OLD2.7Z"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.7z")).unwrap();

        let removed = purge_archives(dir.path()).unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("nested.7z").is_dir());
        assert!(!dir.path().join("old.7z").exists());
    }

    #[cfg(unix)]
    #[test]
    fn purge_removes_archives_with_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join(OsStr::from_bytes(b"build-\xff.7z"));
        let other = dir.path().join(OsStr::from_bytes(b"notes-\xff.txt"));
        fs::write(&stale, b"x").unwrap();
        fs::write(&other, b"x").unwrap();
        assert_eq!(count_archives(dir.path()), 1);

        assert_eq!(purge_archives(dir.path()).unwrap(), 1);
        assert!(!stale.exists());
        assert!(other.exists());
    }

    #[test]
    fn purge_missing_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(purge_archives(&dir.path().join("absent")).unwrap(), 0);
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn count_archives_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.7z"), b"x").unwrap();
        fs::write(dir.path().join("b.zip"), b"x").unwrap();
        assert_eq!(count_archives(dir.path()), 1);
    }
}
