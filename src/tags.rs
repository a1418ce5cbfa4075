//! Tag list parsing, validation and the sorted tag set.
//!
//! Tags are stored inside the image as a single delimiter-joined string;
//! this module owns the split/join rules and keeps the in-memory set
//! sorted, unique and free of the delimiter character.

use crate::error::{Result, TagError};

/// Character separating tags inside the stored subject string.
/// Forbidden inside individual tag values.
pub const TAG_DELIMITER: char = ';';

/// Separator used when joining tags back into the stored string.
pub const TAG_SEPARATOR: &str = "; ";

/// Strip NUL bytes from a raw field value. UTF-16 padding and some
/// writers leave them behind.
pub fn clean_field(raw: &str) -> String {
    raw.chars().filter(|&c| c != '\0').collect()
}

/// Split a stored subject string into individual tags.
///
/// The delimiter may be surrounded by whitespace; empty entries are
/// discarded and the result is sorted case-sensitively.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = raw
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Why a candidate tag is unusable, or `None` if it is fine.
/// The message is shown verbatim to the user at entry time.
pub fn invalid_reason(tag: &str) -> Option<String> {
    if tag.trim().is_empty() {
        return Some("tag must not be empty".to_string());
    }
    if tag.contains(TAG_DELIMITER) {
        return Some(format!(
            "character \"{TAG_DELIMITER}\" is not allowed in tag \"{tag}\""
        ));
    }
    None
}

/// The set of tags on one image: unique, sorted case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    /// Parse the stored subject string into a set.
    pub fn from_raw(raw: &str) -> Self {
        TagSet {
            tags: split_tags(&clean_field(raw)),
        }
    }

    /// Add a tag. Fails if the tag is empty, contains the delimiter,
    /// or is already present; the set is unchanged on failure.
    pub fn add(&mut self, tag: &str) -> Result<()> {
        let tag = tag.trim();
        if let Some(reason) = invalid_reason(tag) {
            return Err(TagError::InvalidTag(reason));
        }
        if self.contains(tag) {
            return Err(TagError::InvalidTag(format!(
                "tag \"{tag}\" already exists in this file"
            )));
        }
        let idx = self.tags.partition_point(|t| t.as_str() < tag);
        self.tags.insert(idx, tag.to_string());
        Ok(())
    }

    /// Remove a tag. Removing an absent tag is a no-op.
    pub fn remove(&mut self, tag: &str) -> bool {
        match self.tags.iter().position(|t| t == tag) {
            Some(idx) => {
                self.tags.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.binary_search_by(|t| t.as_str().cmp(tag)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Join back into the stored form: sorted order, `"; "`-separated.
    pub fn join(&self) -> String {
        self.tags.join(TAG_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_discards_empty_and_sorts() {
        let tags = split_tags("banana ;  apple;; cherry ;");
        assert_eq!(tags, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_split_is_case_sensitive() {
        // Uppercase sorts before lowercase, duplicates collapse
        let tags = split_tags("pear; Pear; pear");
        assert_eq!(tags, vec!["Pear", "pear"]);
    }

    #[test]
    fn test_clean_field_strips_nul() {
        assert_eq!(clean_field("a\0b\0"), "ab");
    }

    #[test]
    fn test_add_rejects_delimiter_and_empty() {
        let mut set = TagSet::default();
        assert!(set.add("a;b").is_err());
        assert!(set.add("   ").is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut set = TagSet::default();
        set.add("dog").unwrap();
        assert!(set.add("dog").is_err());
        assert!(set.add(" dog ").is_err());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_stays_sorted_through_mutations() {
        let mut set = TagSet::from_raw("m; z");
        set.add("a").unwrap();
        set.add("q").unwrap();
        set.remove("z");
        let tags: Vec<&str> = set.iter().collect();
        assert_eq!(tags, vec!["a", "m", "q"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = TagSet::from_raw("a; b");
        assert!(!set.remove("c"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_join_uses_separator() {
        let set = TagSet::from_raw("b;a");
        assert_eq!(set.join(), "a; b");
    }
}
