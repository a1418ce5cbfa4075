//! Reading and writing the two managed EXIF fields.
//!
//! Titles live in `XPTitle` (0x9C9B) and tags in `XPSubject` (0x9C9F),
//! both stored as UTF-16LE byte arrays. Reads go through `kamadak-exif`,
//! writes through `little_exif`; the two halves never share state beyond
//! the file itself.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use exif::{Context, In, Reader, Tag, Value};
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;

use crate::error::{Result, TagError};
use crate::tags::{clean_field, TagSet};

/// EXIF tag id of the title field (XPTitle).
pub const TITLE_TAG: u16 = 0x9c9b;
/// EXIF tag id of the tag/subject field (XPSubject).
pub const SUBJECT_TAG: u16 = 0x9c9f;

/// Decode a UTF-16LE byte array as written by Windows-style XP fields.
/// Odd trailing bytes are dropped, NULs stripped.
fn decode_ucs2(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    clean_field(&String::from_utf16_lossy(&units))
}

/// Extract one XP field as a cleaned string, or `None` if absent.
fn xp_field(exif: &exif::Exif, tag_id: u16) -> Option<String> {
    let field = exif.get_field(Tag(Context::Tiff, tag_id), In::PRIMARY)?;
    match &field.value {
        Value::Byte(bytes) => Some(decode_ucs2(bytes)),
        // Some writers store the XP fields as plain ASCII instead
        Value::Ascii(chunks) => Some(clean_field(
            &chunks
                .iter()
                .map(|c| String::from_utf8_lossy(c).to_string())
                .collect::<Vec<_>>()
                .join(" "),
        )),
        _ => None,
    }
}

/// Read both raw field strings from a file. A file without an EXIF
/// container yields empty fields rather than an error.
fn read_fields(path: &Path) -> Result<(String, String)> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(&file);
    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok((
            xp_field(&exif, TITLE_TAG).unwrap_or_default(),
            xp_field(&exif, SUBJECT_TAG).unwrap_or_default(),
        )),
        Err(_) => Ok((String::new(), String::new())),
    }
}

/// Quiet keyword probe used by search: true when the title or the raw
/// tag string contains `keyword`. Unreadable files never match.
pub fn contains_keyword(path: &Path, keyword: &str) -> bool {
    match read_fields(path) {
        Ok((title, subjects)) => title.contains(keyword) || subjects.contains(keyword),
        Err(_) => false,
    }
}

/// Read the EXIF orientation value (1..=8), if present.
pub fn read_orientation(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(&file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    field.value.get_uint(0)
}

/// One open title/tag record.
///
/// Holds the fields in memory for the editing session; [`save`] flushes
/// them back into the file. The editor keeps at most one record open at
/// a time, closing the previous one before opening the next.
///
/// [`save`]: MetadataFile::save
#[derive(Debug)]
pub struct MetadataFile {
    path: PathBuf,
    title: String,
    tags: TagSet,
    dirty: bool,
}

impl MetadataFile {
    /// Load the record from a file's embedded metadata.
    pub fn open(path: &Path) -> Result<Self> {
        let (title, subjects) = read_fields(path)?;
        Ok(MetadataFile {
            path: path.to_path_buf(),
            title,
            tags: TagSet::from_raw(&subjects),
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: String) {
        if self.title != title {
            self.title = title;
            self.dirty = true;
        }
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Add a tag, rejecting empty/delimiter-bearing/duplicate values.
    pub fn add_tag(&mut self, tag: &str) -> Result<()> {
        self.tags.add(tag)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove a tag; removing an absent tag is a no-op.
    pub fn remove_tag(&mut self, tag: &str) {
        if self.tags.remove(tag) {
            self.dirty = true;
        }
    }

    /// Flush the record back into the file and consume it.
    ///
    /// Unmodified records skip the write so browsing never rewrites
    /// files on disk.
    pub fn save(self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        // Preserve whatever other EXIF the file already carries
        let mut metadata = Metadata::new_from_path(&self.path).unwrap_or_else(|_| Metadata::new());
        metadata.set_tag(ExifTag::XPTitle(self.title.clone()));
        metadata.set_tag(ExifTag::XPSubject(self.tags.join()));
        metadata
            .write_to_file(&self.path)
            .map_err(|e| TagError::Metadata {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }
}
