//! Keyword search over titles/tags and export of the matches.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::metadata;

/// How matched files are placed into the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Full copies: larger, but self-contained
    Copies,
    /// Symbolic links where the platform supports them
    Links,
}

/// Files whose title or tag string contains *every* keyword.
pub fn matching_files(paths: &[PathBuf], keywords: &[String]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|p| keywords.iter().all(|k| metadata::contains_keyword(p, k)))
        .cloned()
        .collect()
}

/// Summed file size of `paths` in bytes; unreadable entries count zero.
pub fn total_size(paths: &[PathBuf]) -> u64 {
    paths
        .iter()
        .filter_map(|p| fs::metadata(p).ok())
        .map(|m| m.len())
        .sum()
}

/// Pick a file name for `path` that is unique within `taken`, suffixing
/// the stem with `_2`, `_3`, ... on collision. The chosen name is
/// recorded in `taken`.
pub fn unique_alias(path: &Path, taken: &mut HashSet<String>) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let alias = if counter == 1 {
            format!("{stem}{ext}")
        } else {
            format!("{stem}_{counter}{ext}")
        };
        if taken.insert(alias.clone()) {
            return alias;
        }
        counter += 1;
    }
}

/// Place every match into `target` under a collision-free alias.
/// Returns the number of files exported.
pub fn export(matches: &[PathBuf], target: &Path, mode: ExportMode) -> Result<usize> {
    let mut taken = HashSet::new();
    for source in matches {
        let alias = unique_alias(source, &mut taken);
        let dest = target.join(&alias);
        match mode {
            ExportMode::Copies => {
                fs::copy(source, &dest)?;
            }
            ExportMode::Links => {
                link_or_copy(source, &dest)?;
            }
        }
    }
    info!(count = matches.len(), target = %target.display(), "exported search results");
    Ok(matches.len())
}

#[cfg(unix)]
fn link_or_copy(source: &Path, dest: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, dest)?;
    Ok(())
}

#[cfg(not(unix))]
fn link_or_copy(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_is_collision_free() {
        let mut taken = HashSet::new();
        assert_eq!(unique_alias(Path::new("/a/pic.jpg"), &mut taken), "pic.jpg");
        assert_eq!(
            unique_alias(Path::new("/b/pic.jpg"), &mut taken),
            "pic_2.jpg"
        );
        assert_eq!(
            unique_alias(Path::new("/c/pic.jpg"), &mut taken),
            "pic_3.jpg"
        );
        assert_eq!(
            unique_alias(Path::new("/d/other.jpg"), &mut taken),
            "other.jpg"
        );
    }

    #[test]
    fn test_export_copies_with_aliases() {
        let src_a = tempfile::tempdir().unwrap();
        let src_b = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();

        let a = src_a.path().join("pic.jpg");
        let b = src_b.path().join("pic.jpg");
        fs::write(&a, b"first").unwrap();
        fs::write(&b, b"second").unwrap();

        let count = export(
            &[a.clone(), b.clone()],
            target.path(),
            ExportMode::Copies,
        )
        .unwrap();
        assert_eq!(count, 2);
        assert_eq!(fs::read(target.path().join("pic.jpg")).unwrap(), b"first");
        assert_eq!(
            fs::read(target.path().join("pic_2.jpg")).unwrap(),
            b"second"
        );
    }
}
