//! Content filter: tells prose apart from stylesheet and markup noise
//!
//! This is a heuristic. It exists to drop boilerplate without paying for a
//! real HTML/CSS parse, and both false positives and false negatives are
//! expected. The thresholds come from [`FilterConfig`].

use crate::config::FilterConfig;
use crate::error::{FlowstateError, Result};
use regex::Regex;
use thiserror::Error;

/// Why a text blob was not accepted as prose
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum Rejection {
    #[error("text too short to classify ({chars} chars)")]
    TooShort { chars: usize },

    #[error("looks like an embedded stylesheet ({hits} style terms)")]
    Stylesheet { hits: usize },

    #[error("looks like code or markup ({braces} braces, {semicolons} semicolons)")]
    CodeLike { braces: usize, semicolons: usize },

    #[error("too few Latin letters ({ratio:.2})")]
    LowLetterRatio { ratio: f64 },
}

/// Prose classifier over already-collapsed text
#[derive(Debug, Clone)]
pub struct ContentFilter {
    config: FilterConfig,
    stylesheet_terms: Option<Regex>,
}

impl ContentFilter {
    /// Build a filter, compiling the stylesheet vocabulary into one matcher
    pub fn new(config: FilterConfig) -> Result<Self> {
        let alternatives: Vec<String> = config
            .stylesheet_terms
            .iter()
            .filter(|term| !term.is_empty())
            .map(|term| whole_word_pattern(term))
            .collect();

        let stylesheet_terms = if alternatives.is_empty() {
            None
        } else {
            let pattern = alternatives.join("|");
            Some(Regex::new(&pattern).map_err(|e| FlowstateError::Config(e.to_string()))?)
        };

        Ok(Self {
            config,
            stylesheet_terms,
        })
    }

    /// Boolean view of [`ContentFilter::classify`]
    pub fn is_prose(&self, text: &str) -> bool {
        self.classify(text).is_ok()
    }

    /// Run the checks in order and report the first one that fails
    pub fn classify(&self, text: &str) -> std::result::Result<(), Rejection> {
        let text = text.trim();
        let chars = text.chars().count();

        if chars < self.config.min_chars {
            return Err(Rejection::TooShort { chars });
        }

        let hits = self
            .stylesheet_terms
            .as_ref()
            .map_or(0, |re| re.find_iter(text).count());
        if hits > self.config.max_stylesheet_hits {
            return Err(Rejection::Stylesheet { hits });
        }

        let braces = text.chars().filter(|c| matches!(c, '{' | '}')).count();
        let semicolons = text.chars().filter(|&c| c == ';').count();
        if braces > self.config.max_braces && semicolons > self.config.max_semicolons {
            return Err(Rejection::CodeLike { braces, semicolons });
        }

        let letters = text.chars().filter(|&c| is_latin_letter(c)).count();
        let ratio = letters as f64 / chars as f64;
        if ratio < self.config.min_letter_ratio {
            return Err(Rejection::LowLetterRatio { ratio });
        }

        Ok(())
    }
}

/// Strip zero-width characters and byte-order marks, collapse whitespace runs
/// to single spaces and trim
pub fn clean_text(text: &str) -> String {
    let visible: String = text
        .chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect();
    visible.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII letters plus Latin-1 Supplement through Latin Extended-B
fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c)
}

/// Anchor a term on word boundaries only where the term itself starts or ends
/// with a word character, so `@page` still matches after a space
fn whole_word_pattern(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if term.chars().next().is_some_and(is_word) { r"\b" } else { "" };
    let trail = if term.chars().last().is_some_and(is_word) { r"\b" } else { "" };
    format!("{}{}{}", lead, regex::escape(term), trail)
}
