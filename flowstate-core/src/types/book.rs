//! The loaded book: the global token sequence and its fragment index

use super::{FragmentRecord, Token};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Cheap identity proxy for a book file: display name plus byte size
///
/// Two distinct files with the same name and size collide. That is accepted:
/// the fingerprint only gates whether saved progress is offered for resume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookFingerprint(String);

impl BookFingerprint {
    pub fn new(display_name: &str, display_size: u64) -> Self {
        Self(format!("{}::{}", display_name, display_size))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The complete, immutable result of assembling one book
#[derive(Debug, Clone)]
pub struct LoadedBook {
    spine_count: usize,
    tokens: Vec<Token>,
    fragments: Vec<FragmentRecord>,
    by_fragment_index: HashMap<usize, usize>,
}

impl LoadedBook {
    /// Build a book from already-assigned fragments
    ///
    /// Only the assembler calls this; it owns global index assignment.
    pub(crate) fn new(
        spine_count: usize,
        tokens: Vec<Token>,
        fragments: Vec<FragmentRecord>,
    ) -> Self {
        let by_fragment_index = fragments
            .iter()
            .enumerate()
            .map(|(position, fragment)| (fragment.fragment_index, position))
            .collect();

        Self {
            spine_count,
            tokens,
            fragments,
            by_fragment_index,
        }
    }

    /// Number of spine entries scanned, accepted or not
    pub fn spine_count(&self) -> usize {
        self.spine_count
    }

    /// Total number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the book has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The whole-book token sequence
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token at a global index
    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Accepted fragments in spine order
    pub fn fragments(&self) -> &[FragmentRecord] {
        &self.fragments
    }

    /// Look up an accepted fragment by its spine index
    pub fn fragment(&self, fragment_index: usize) -> Option<&FragmentRecord> {
        self.by_fragment_index
            .get(&fragment_index)
            .and_then(|&position| self.fragments.get(position))
    }

    /// Find the fragment owning a global token index
    pub fn fragment_for_token(&self, global_index: usize) -> Option<&FragmentRecord> {
        let position = self
            .fragments
            .partition_point(|fragment| fragment.token_end() <= global_index);
        self.fragments
            .get(position)
            .filter(|fragment| fragment.contains(global_index))
    }

    /// Tokens owned by one fragment
    pub fn fragment_tokens(&self, fragment: &FragmentRecord) -> &[Token] {
        self.tokens
            .get(fragment.token_range.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(fragment_index: usize, range: std::ops::Range<usize>) -> FragmentRecord {
        FragmentRecord {
            fragment_index,
            href: Some(format!("ch{}.xhtml", fragment_index)),
            idref: None,
            document: scraper::Html::new_document(),
            text_nodes: Vec::new(),
            token_range: range,
        }
    }

    fn tokens(count: usize) -> Vec<Token> {
        (0..count)
            .map(|i| Token {
                word: format!("w{}", i),
                fragment_index: 0,
                fragment_ref: None,
                node_index: 0,
                start_offset: 0,
                end_offset: 2,
            })
            .collect()
    }

    #[test]
    fn test_fingerprint_format() {
        let fp = BookFingerprint::new("Alice.epub", 1234);
        assert_eq!(fp.as_str(), "Alice.epub::1234");
        assert_eq!(fp.to_string(), "Alice.epub::1234");
    }

    #[test]
    fn test_fragment_lookup() {
        let book = LoadedBook::new(6, tokens(10), vec![fragment(1, 0..4), fragment(4, 4..10)]);

        assert_eq!(book.spine_count(), 6);
        assert_eq!(book.len(), 10);
        assert!(book.fragment(1).is_some());
        assert!(book.fragment(2).is_none());
        assert_eq!(book.fragment(4).map(|f| f.token_start()), Some(4));
    }

    #[test]
    fn test_fragment_for_token() {
        let book = LoadedBook::new(6, tokens(10), vec![fragment(1, 0..4), fragment(4, 4..10)]);

        assert_eq!(book.fragment_for_token(0).map(|f| f.fragment_index), Some(1));
        assert_eq!(book.fragment_for_token(3).map(|f| f.fragment_index), Some(1));
        assert_eq!(book.fragment_for_token(4).map(|f| f.fragment_index), Some(4));
        assert_eq!(book.fragment_for_token(9).map(|f| f.fragment_index), Some(4));
        assert!(book.fragment_for_token(10).is_none());
    }

    #[test]
    fn test_fragment_tokens_slice() {
        let book = LoadedBook::new(2, tokens(10), vec![fragment(0, 0..4), fragment(1, 4..10)]);
        let second = &book.fragments()[1];
        let slice = book.fragment_tokens(second);
        assert_eq!(slice.len(), 6);
        assert_eq!(slice[0].word, "w4");
    }
}
