//! Fragment record: one accepted spine entry and the token range it owns

use super::Token;
use std::ops::Range;

/// One accepted spine entry of a loaded book
#[derive(Debug, Clone)]
pub struct FragmentRecord {
    /// Position of this entry in spine order
    pub fragment_index: usize,

    /// Path of the fragment inside the container
    pub href: Option<String>,

    /// Manifest id the spine entry refers to
    pub idref: Option<String>,

    /// Normalized document with noise elements removed
    pub document: scraper::Html,

    /// Non-empty text nodes in document order; token offsets index into these
    pub text_nodes: Vec<String>,

    /// Half-open range of global token indices owned by this fragment
    pub token_range: Range<usize>,
}

impl FragmentRecord {
    /// First global token index owned by this fragment
    pub fn token_start(&self) -> usize {
        self.token_range.start
    }

    /// One past the last global token index owned by this fragment
    pub fn token_end(&self) -> usize {
        self.token_range.end
    }

    /// Number of tokens in this fragment
    pub fn token_count(&self) -> usize {
        self.token_range.len()
    }

    /// Whether a global token index falls inside this fragment
    pub fn contains(&self, global_index: usize) -> bool {
        self.token_range.contains(&global_index)
    }

    /// Raw text of the node a token was cut from
    pub fn node_text(&self, token: &Token) -> Option<&str> {
        self.text_nodes.get(token.node_index).map(String::as_str)
    }

    /// Human-readable locator, preferring the href
    pub fn locator(&self) -> Option<&str> {
        self.href.as_deref().or(self.idref.as_deref())
    }
}
