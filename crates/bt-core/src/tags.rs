//! Tag vocabulary: the set of known tag strings offered for autocomplete.

use std::collections::HashSet;

/// Append-only, insertion-ordered set of tags. Uniqueness is
/// case-sensitive (`"Cat"` and `"cat"` are distinct tags).
#[derive(Debug, Clone, Default)]
pub struct TagVocabulary {
    order: Vec<String>,
    known: HashSet<String>,
}

impl TagVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the remote tag listing, dropping duplicates and blanks.
    pub fn seeded<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        vocab.extend(tags);
        vocab
    }

    /// Merge tags from a (re)fetch. Existing order is preserved; unseen tags
    /// are appended. Returns how many tags were added.
    pub fn extend<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for tag in tags {
            if self.insert(tag) {
                added += 1;
            }
        }
        added
    }

    /// Insert one tag. Returns `true` if the vocabulary grew.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.is_empty() || self.known.contains(&tag) {
            return false;
        }
        self.known.insert(tag.clone());
        self.order.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.known.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Autocomplete: tags containing `input`, ignoring case, in insertion
    /// order. An empty input lists everything.
    pub fn suggest(&self, input: &str) -> Vec<&str> {
        let needle = input.trim().to_lowercase();
        self.order
            .iter()
            .filter(|t| needle.is_empty() || t.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }
}
