//! Terminal EXIF title/tag editor with a popup image preview.
//!
//! The crate builds two cooperating binaries: the `phototag` editor
//! (interactive terminal menus, metadata editing, search) and the
//! `phototag-viewer` popup window. They share no channel other than a
//! drop directory on disk; see [`preview`] for the editor half of that
//! handshake and [`viewer`] for the polling half.

pub mod app;
pub mod config;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod preview;
pub mod scan;
pub mod search;
pub mod suggest;
pub mod tags;
pub mod ui;
pub mod viewer;

pub use error::{Result, TagError};
pub use metadata::MetadataFile;
pub use tags::TagSet;
