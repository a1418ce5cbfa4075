//! Recursive enumeration of candidate image files.
//!
//! Files split into two buckets: natively compatible types that can be
//! edited in place, and files that first need a JPEG conversion. The
//! latter are admitted only when a decode probe confirms they really are
//! images and no converted sibling exists yet.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::convert::conversion_target;

/// Extensions whose EXIF container we can edit directly.
pub const COMPATIBLE_EXTENSIONS: &[&str] = &[
    // JPEG 2000 family
    "jp2", "j2k", "jpf", "jpm", "jpg2", "j2c", "jpc", "jpx", "mj2",
    // JPEG family
    "jpg", "jpeg", "jpe", "jif", "jfif", "jfi",
    // Others with EXIF support
    "psd", "tiff", "tif", "webp",
];

/// How a scanned file can be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Metadata can be edited in place
    Editable,
    /// Decodable image, but needs a JPEG conversion first
    NeedsConversion,
}

/// One enumerated file.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Result of one enumeration pass.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Candidates sorted case-insensitively by path
    pub files: Vec<Candidate>,
    /// Accumulated size of all candidates, in bytes
    pub total_bytes: u64,
}

/// True when the extension is directly editable.
pub fn is_compatible(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| COMPATIBLE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Full decode probe. Used both to vet conversion candidates and to
/// drop files that stopped being readable between scan and edit.
pub fn is_image(path: &Path) -> bool {
    image::open(path).is_ok()
}

/// Walk `root` depth-first and collect candidates.
///
/// Permission errors are skipped silently and enumeration continues.
/// In strict mode only natively compatible files are returned (used by
/// search, which cannot do anything with unconverted files).
pub fn scan(root: &Path, strict: bool) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let kind = if is_compatible(path) {
            FileKind::Editable
        } else {
            if strict {
                continue;
            }
            // Already converted earlier?
            if conversion_target(path).is_file() {
                continue;
            }
            if !is_image(path) {
                continue;
            }
            FileKind::NeedsConversion
        };

        if let Ok(meta) = entry.metadata() {
            outcome.total_bytes += meta.len();
        }
        outcome.files.push(Candidate {
            path: path.to_path_buf(),
            kind,
        });
    }

    outcome
        .files
        .sort_by_key(|c| c.path.to_string_lossy().to_lowercase());
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_mixed_directory_buckets() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg");
        write_image(dir.path(), "b.jpg");
        write_image(dir.path(), "c.jpg");
        write_image(dir.path(), "d.png");

        let outcome = scan(dir.path(), false);
        assert_eq!(outcome.files.len(), 4);
        assert!(outcome.total_bytes > 0);

        let png = outcome
            .files
            .iter()
            .find(|c| c.path.extension().unwrap() == "png")
            .unwrap();
        assert_eq!(png.kind, FileKind::NeedsConversion);
        assert!(outcome
            .files
            .iter()
            .filter(|c| c.kind == FileKind::Editable)
            .count()
            == 3);
    }

    #[test]
    fn test_converted_sibling_skips_png() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "photo.png");
        write_image(dir.path(), "photo.jpeg");

        let outcome = scan(dir.path(), false);
        let names: Vec<String> = outcome
            .files
            .iter()
            .map(|c| c.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["photo.jpeg"]);
    }

    #[test]
    fn test_non_image_files_excluded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
        write_image(dir.path(), "real.jpg");

        let outcome = scan(dir.path(), false);
        assert_eq!(outcome.files.len(), 1);
    }

    #[test]
    fn test_strict_mode_drops_conversion_candidates() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.jpg");
        write_image(dir.path(), "b.png");

        let outcome = scan(dir.path(), true);
        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].kind, FileKind::Editable);
    }

    #[test]
    fn test_recursion_and_case_insensitive_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Sub")).unwrap();
        write_image(dir.path(), "Zebra.jpg");
        write_image(&dir.path().join("Sub"), "apple.jpg");

        let outcome = scan(dir.path(), false);
        let names: Vec<String> = outcome
            .files
            .iter()
            .map(|c| c.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        // "<dir>/Sub/apple.jpg" sorts before "<dir>/Zebra.jpg" ignoring case
        assert_eq!(names, vec!["apple.jpg", "Zebra.jpg"]);
    }
}
