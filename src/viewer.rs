//! Viewer side of the drop-directory handshake.
//!
//! Everything here is plain filesystem and pixel work so the polling
//! contract stays testable without a window: the iced shell in
//! `src/bin/viewer.rs` only ticks [`take_next`] on a timer and shows
//! whatever comes back.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::metadata;

/// Idle poll cadence.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// One tightened tick right after a render, in case the editor queued
/// the next image while we were drawing.
pub const POLL_INTERVAL_FAST: Duration = Duration::from_millis(10);

/// Target on-screen pixel count after downscaling.
pub const PIXEL_BUDGET: u32 = 500_000;

/// A decoded, oriented and downscaled image ready for the window.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixel rows
    pub pixels: Vec<u8>,
}

/// Power-of-two factor dividing both axes so the pixel count lands near
/// [`PIXEL_BUDGET`]. Images at or below the budget keep factor 1.
pub fn downscale_factor(width: u32, height: u32) -> u32 {
    let ratio = (width as f64) * (height as f64) / (PIXEL_BUDGET as f64);
    if ratio <= 1.0 {
        return 1;
    }
    let exp = (ratio.log2() / 2.0).ceil() as u32;
    1 << exp
}

/// The lexicographically first file in the drop directory, if any.
/// A missing directory means "nothing to do yet", not an error.
fn first_entry(drop_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(drop_dir).ok()?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    files.into_iter().next()
}

/// Apply an EXIF orientation value (1..=8) to a decoded image.
fn orient(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// One poll tick: try to consume the next dropped file.
///
/// The full decode doubles as the completeness check: a file still being
/// copied fails to decode, is left in place, and is retried next tick.
/// Only a successfully decoded file is removed from the slot.
pub fn take_next(drop_dir: &Path) -> Option<LoadedImage> {
    let path = first_entry(drop_dir)?;

    let Ok(img) = image::open(&path) else {
        // Mid-copy or not an image; leave it for the next tick
        return None;
    };

    let orientation = metadata::read_orientation(&path).unwrap_or(1);
    let img = orient(img, orientation);

    let k = downscale_factor(img.width(), img.height());
    let img = if k > 1 {
        img.resize_exact(img.width() / k, img.height() / k, FilterType::Triangle)
    } else {
        img
    };

    let _ = fs::remove_file(&path);
    debug!(path = %path.display(), k, "consumed dropped image");

    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    Some(LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, 128])
        });
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Jpeg)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_downscale_factor_below_budget() {
        assert_eq!(downscale_factor(100, 100), 1);
        // Exactly on budget keeps factor 1
        assert_eq!(downscale_factor(1000, 500), 1);
    }

    #[test]
    fn test_downscale_factor_above_budget() {
        // 4x the budget: halving both axes lands exactly on it
        assert_eq!(downscale_factor(2000, 1000), 2);
        // 8x the budget rounds the exponent up
        assert_eq!(downscale_factor(4000, 1000), 4);
        assert_eq!(downscale_factor(8000, 4000), 8);
    }

    #[test]
    fn test_missing_drop_dir_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        assert!(take_next(&dir.path().join("preview")).is_none());
    }

    #[test]
    fn test_partial_copy_is_neither_rendered_nor_removed() {
        let dir = tempfile::tempdir().unwrap();
        let drop_dir = dir.path().join("preview");
        fs::create_dir_all(&drop_dir).unwrap();

        let full = jpeg_bytes(16, 16);
        let partial = &full[..full.len() / 2];
        let path = drop_dir.join("truncated.jpg");
        fs::write(&path, partial).unwrap();

        assert!(take_next(&drop_dir).is_none());
        assert!(path.is_file());

        // The copy finishes; the next tick consumes and removes it
        fs::write(&path, &full).unwrap();
        let loaded = take_next(&drop_dir).unwrap();
        assert_eq!((loaded.width, loaded.height), (16, 16));
        assert!(!path.exists());
    }

    #[test]
    fn test_two_pending_drops_consume_one_per_tick() {
        let dir = tempfile::tempdir().unwrap();
        let drop_dir = dir.path().join("preview");
        fs::create_dir_all(&drop_dir).unwrap();
        fs::write(drop_dir.join("a.jpg"), jpeg_bytes(8, 8)).unwrap();
        fs::write(drop_dir.join("b.jpg"), jpeg_bytes(8, 4)).unwrap();

        // First tick takes the lexicographically first entry only
        let first = take_next(&drop_dir).unwrap();
        assert_eq!((first.width, first.height), (8, 8));
        assert!(!drop_dir.join("a.jpg").exists());
        assert!(drop_dir.join("b.jpg").is_file());

        let second = take_next(&drop_dir).unwrap();
        assert_eq!((second.width, second.height), (8, 4));
        assert!(take_next(&drop_dir).is_none());
    }

    #[test]
    fn test_orientation_rotation_swaps_axes() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(6, 2));
        let rotated = orient(img, 6);
        assert_eq!((rotated.width(), rotated.height()), (2, 6));
    }

    #[test]
    fn test_large_image_is_downscaled_on_take() {
        let dir = tempfile::tempdir().unwrap();
        let drop_dir = dir.path().join("preview");
        fs::create_dir_all(&drop_dir).unwrap();
        fs::write(drop_dir.join("big.jpg"), jpeg_bytes(2000, 1000)).unwrap();

        let loaded = take_next(&drop_dir).unwrap();
        assert_eq!((loaded.width, loaded.height), (1000, 500));
        assert_eq!(loaded.pixels.len(), 1000 * 500 * 4);
    }
}
