//! One-shot JPEG conversion for files we cannot edit in place.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;

use crate::error::Result;

/// Extension given to converted siblings.
pub const CONVERSION_EXTENSION: &str = "jpeg";

/// JPEG quality for converted files.
const CONVERSION_QUALITY: u8 = 95;

/// Path the converted sibling of `path` would occupy.
pub fn conversion_target(path: &Path) -> PathBuf {
    path.with_extension(CONVERSION_EXTENSION)
}

/// Decode `path`, flatten to RGB and write the JPEG sibling.
/// Returns the sibling path. An existing target is overwritten; the
/// caller is responsible for confirming that with the user first.
pub fn convert_to_jpeg(path: &Path) -> Result<PathBuf> {
    let target = conversion_target(path);
    let img = image::open(path)?.to_rgb8();

    let out = BufWriter::new(File::create(&target)?);
    let encoder = JpegEncoder::new_with_quality(out, CONVERSION_QUALITY);
    img.write_with_encoder(encoder)?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_target_swaps_extension() {
        assert_eq!(
            conversion_target(Path::new("/pics/cat.png")),
            PathBuf::from("/pics/cat.jpeg")
        );
    }

    #[test]
    fn test_png_converts_to_decodable_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("shot.png");
        // Alpha channel forces the RGB flatten path
        RgbaImage::from_pixel(6, 6, Rgba([200, 100, 50, 255]))
            .save(&src)
            .unwrap();

        let target = convert_to_jpeg(&src).unwrap();
        assert_eq!(target, dir.path().join("shot.jpeg"));

        let converted = image::open(&target).unwrap();
        assert_eq!(converted.width(), 6);
        assert_eq!(converted.height(), 6);
    }

    #[test]
    fn test_non_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bogus.png");
        std::fs::write(&src, b"not a png").unwrap();
        assert!(convert_to_jpeg(&src).is_err());
    }
}
