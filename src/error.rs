//! Error types shared across the editor and viewer.

use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of metadata editing, enumeration and the preview
/// handshake. Polling-side races (partial copies, vanished files) are
/// deliberately *not* represented here: the viewer treats those as
/// "retry next tick" and they never surface as errors.
#[derive(Debug, Error)]
pub enum TagError {
    /// File system I/O errors including permission problems
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// EXIF container could not be read or written
    #[error("metadata error in {path}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    /// A tag failed validation at entry time
    #[error("{0}")]
    InvalidTag(String),

    /// The suggestion file could not be loaded
    #[error("suggestion file error: {0}")]
    Suggestions(String),
}

pub type Result<T> = std::result::Result<T, TagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_tag_display() {
        let err = TagError::InvalidTag("character \";\" is not allowed in tag \"a;b\"".into());
        assert_eq!(
            err.to_string(),
            "character \";\" is not allowed in tag \"a;b\""
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TagError = io.into();
        assert!(matches!(err, TagError::Io(_)));
    }
}
