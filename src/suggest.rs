//! Tag suggestions backing Tab-completion in the entry prompts.
//!
//! Suggestions live in a user-editable text file, one per line. Blank
//! lines and `#` comments are ignored. A load that finds the delimiter
//! character anywhere fails and leaves the previous list untouched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TagError};
use crate::tags::TAG_DELIMITER;

/// Lines starting with this character are ignored.
pub const COMMENT_CHAR: char = '#';

/// Written to the suggestion file the first time it is loaded.
const TEMPLATE: &str = "\
# Tag suggestions, one per line.
# Lines that are blank or start with \"#\" are ignored.
# A suggestion must not contain the \";\" character.
";

/// The loaded suggestion list.
#[derive(Debug, Default)]
pub struct Suggestions {
    path: PathBuf,
    entries: Vec<String>,
}

impl Suggestions {
    /// Create an empty list backed by `path`. Nothing is read yet.
    pub fn new(path: PathBuf) -> Self {
        Suggestions {
            path,
            entries: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (Re)load the backing file, seeding it from the template when it
    /// does not exist yet. On failure the in-memory list is unchanged.
    pub fn load(&mut self) -> Result<usize> {
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, TEMPLATE)?;
        }

        let contents = fs::read_to_string(&self.path)?;
        let mut loaded = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_CHAR) {
                continue;
            }
            if line.contains(TAG_DELIMITER) {
                return Err(TagError::Suggestions(format!(
                    "line \"{line}\" contains the character \"{TAG_DELIMITER}\""
                )));
            }
            loaded.push(line.to_string());
        }

        self.entries = loaded;
        Ok(self.entries.len())
    }

    /// Case-insensitive prefix matches, sorted case-insensitively.
    /// An empty prefix matches everything.
    pub fn matches(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let mut hits: Vec<String> = self
            .entries
            .iter()
            .filter(|s| s.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        hits.sort_by_key(|s| s.to_lowercase());
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestions_with(contents: &str) -> (tempfile::TempDir, Suggestions) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TagSuggestions.txt");
        fs::write(&path, contents).unwrap();
        (dir, Suggestions::new(path))
    }

    #[test]
    fn test_comments_and_blanks_load_as_empty() {
        let (_dir, mut sug) = suggestions_with("# header\n\n   \n# more\n");
        assert_eq!(sug.load().unwrap(), 0);
        assert!(sug.is_empty());
    }

    #[test]
    fn test_delimiter_line_fails_and_keeps_previous_list() {
        let (_dir, mut sug) = suggestions_with("beach\nforest\n");
        assert_eq!(sug.load().unwrap(), 2);

        fs::write(sug.path(), "beach\nbad;line\n").unwrap();
        assert!(sug.load().is_err());
        assert_eq!(sug.len(), 2);
    }

    #[test]
    fn test_missing_file_is_seeded_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TagSuggestions.txt");
        let mut sug = Suggestions::new(path.clone());

        assert_eq!(sug.load().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn test_prefix_matching_ignores_case() {
        let (_dir, mut sug) = suggestions_with("Beach\nbeetle\nforest\n");
        sug.load().unwrap();

        assert_eq!(sug.matches("be"), vec!["Beach", "beetle"]);
        assert_eq!(sug.matches("FOR"), vec!["forest"]);
        assert!(sug.matches("x").is_empty());
        assert_eq!(sug.matches("").len(), 3);
    }
}
