//! Token type: one word plus its back-reference into the source markup

use std::sync::Arc;

/// A single whitespace-delimited word
///
/// Offsets are measured in characters (Unicode scalar values) within the raw
/// text node the word came from, so they stay valid against the original node
/// rather than any cleaned or collapsed copy of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The word itself; never empty, never contains whitespace
    pub word: String,

    /// Spine position of the owning fragment
    pub fragment_index: usize,

    /// Human-readable locator of the owning fragment (usually its href)
    pub fragment_ref: Option<Arc<str>>,

    /// Index of the source text node within its fragment
    pub node_index: usize,

    /// Start offset (inclusive) within the text node
    pub start_offset: usize,

    /// End offset (exclusive) within the text node
    pub end_offset: usize,
}

impl Token {
    /// Resolve this token's span against the raw text of its source node
    ///
    /// Returns `None` when the offsets fall outside `node`.
    pub fn source_span<'a>(&self, node: &'a str) -> Option<&'a str> {
        let mut boundaries = node
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(node.len()));
        let start = boundaries.nth(self.start_offset)?;
        let end = if self.end_offset == self.start_offset {
            start
        } else {
            boundaries.nth(self.end_offset - self.start_offset - 1)?
        };
        node.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(word: &str, start: usize, end: usize) -> Token {
        Token {
            word: word.to_string(),
            fragment_index: 0,
            fragment_ref: None,
            node_index: 0,
            start_offset: start,
            end_offset: end,
        }
    }

    #[test]
    fn test_source_span_ascii() {
        let t = token("world", 6, 11);
        assert_eq!(t.source_span("hello world"), Some("world"));
    }

    #[test]
    fn test_source_span_multibyte() {
        let node = "déjà vu, naïve";
        let t = token("naïve", 9, 14);
        assert_eq!(t.source_span(node), Some("naïve"));
    }

    #[test]
    fn test_source_span_out_of_range() {
        let t = token("gone", 10, 14);
        assert_eq!(t.source_span("short"), None);
    }
}
