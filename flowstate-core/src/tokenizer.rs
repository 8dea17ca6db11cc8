//! Word extraction over a fragment's text nodes

use crate::types::Token;
use std::sync::Arc;

/// Split text nodes into whitespace-delimited tokens
///
/// Words are emitted in node order, then match order within each node. No word
/// is split, merged or case-normalized; punctuation stays attached. Offsets are
/// character positions within the raw node text.
pub fn tokenize<S: AsRef<str>>(
    fragment_index: usize,
    fragment_ref: Option<&str>,
    text_nodes: &[S],
) -> Vec<Token> {
    let fragment_ref: Option<Arc<str>> = fragment_ref.map(Arc::from);
    let mut tokens = Vec::new();

    for (node_index, node) in text_nodes.iter().enumerate() {
        for run in word_runs(node.as_ref()) {
            tokens.push(Token {
                word: run.word.to_string(),
                fragment_index,
                fragment_ref: fragment_ref.clone(),
                node_index,
                start_offset: run.start,
                end_offset: run.end,
            });
        }
    }

    tokens
}

/// A maximal run of non-separator characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WordRun<'a> {
    word: &'a str,
    start: usize,
    end: usize,
}

/// Whitespace plus the byte-order mark, which text nodes sometimes carry
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn word_runs(text: &str) -> impl Iterator<Item = WordRun<'_>> {
    let mut chars = text.char_indices().enumerate().peekable();

    std::iter::from_fn(move || {
        // skip separators
        while let Some(&(_, (_, c))) = chars.peek() {
            if !is_separator(c) {
                break;
            }
            chars.next();
        }

        let (start, (byte_start, _)) = chars.next()?;
        let mut end = start + 1;
        let mut byte_end = text.len();

        while let Some(&(index, (byte, c))) = chars.peek() {
            if is_separator(c) {
                byte_end = byte;
                break;
            }
            end = index + 1;
            chars.next();
        }

        Some(WordRun {
            word: &text[byte_start..byte_end],
            start,
            end,
        })
    })
}
