//! Fragment loader: one spine entry in, a normalized tokenized fragment out
//!
//! Nothing about the shape of a fragment's content is an error here. Noise
//! names, unparseable markup, filter rejections and thin fragments all come
//! back as [`FragmentOutcome::Skipped`] so one bad entry never spoils the book.

use crate::config::FragmentConfig;
use crate::container::{Container, SpineEntry};
use crate::error::ParseError;
use crate::filter::{clean_text, ContentFilter, Rejection};
use crate::tokenizer::tokenize;
use crate::types::Token;
use scraper::{Html, Node, Selector};
use std::fmt;

/// A fragment that passed every check, before global indices are assigned
#[derive(Debug, Clone)]
pub struct FragmentDraft {
    pub entry: SpineEntry,
    pub document: Html,
    pub text_nodes: Vec<String>,
    pub tokens: Vec<Token>,
}

/// Why a spine entry was left out of the book
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// href/idref matched the noise vocabulary; content was never loaded
    NoiseName(String),

    /// The container could not produce or parse the content
    Unloadable(ParseError),

    /// The content filter rejected the extracted text
    Rejected(Rejection),

    /// Fewer tokens than the minimum
    TooFewTokens(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoiseName(term) => write!(f, "noise name ({})", term),
            SkipReason::Unloadable(err) => write!(f, "unloadable: {}", err),
            SkipReason::Rejected(rejection) => write!(f, "rejected: {}", rejection),
            SkipReason::TooFewTokens(count) => write!(f, "too few tokens ({})", count),
        }
    }
}

/// Result of loading one spine entry
#[derive(Debug, Clone)]
pub enum FragmentOutcome {
    Accepted(FragmentDraft),
    Skipped(SkipReason),
}

/// Loads, normalizes, filters and tokenizes single fragments
#[derive(Debug, Clone)]
pub struct FragmentLoader {
    config: FragmentConfig,
    filter: ContentFilter,
    noise_selector: Option<Selector>,
}

impl FragmentLoader {
    pub fn new(config: FragmentConfig, filter: ContentFilter) -> Result<Self, ParseError> {
        let noise_selector = if config.noise_elements.is_empty() {
            None
        } else {
            let selector = config.noise_elements.join(", ");
            Some(
                Selector::parse(&selector)
                    .map_err(|e| ParseError::InvalidHtml(format!("{}: {:?}", selector, e)))?,
            )
        };

        Ok(Self {
            config,
            filter,
            noise_selector,
        })
    }

    /// Name-based pre-filter; returns the matching noise term, if any
    pub fn noise_name(&self, entry: &SpineEntry) -> Option<&str> {
        let name = entry.folded_name();
        self.config
            .noise_names
            .iter()
            .map(String::as_str)
            .find(|term| !term.is_empty() && name.contains(&term.to_lowercase()))
    }

    /// Run every step for one spine entry
    pub fn load(&self, container: &mut dyn Container, entry: SpineEntry) -> FragmentOutcome {
        if let Some(term) = self.noise_name(&entry) {
            return FragmentOutcome::Skipped(SkipReason::NoiseName(term.to_string()));
        }

        let markup = match container.load(&entry) {
            Ok(markup) => markup,
            Err(err) => return FragmentOutcome::Skipped(SkipReason::Unloadable(err)),
        };

        self.process(entry, &markup)
    }

    /// Normalize, filter and tokenize already-loaded markup
    pub fn process(&self, entry: SpineEntry, markup: &str) -> FragmentOutcome {
        let document = self.normalize(markup);
        let (full_text, text_nodes) = match extract_text(&document) {
            Ok(extracted) => extracted,
            Err(err) => return FragmentOutcome::Skipped(SkipReason::Unloadable(err)),
        };

        if let Err(rejection) = self.filter.classify(&clean_text(&full_text)) {
            return FragmentOutcome::Skipped(SkipReason::Rejected(rejection));
        }

        let locator = entry.href.as_deref().or(entry.idref.as_deref());
        let tokens = tokenize(entry.index, locator, &text_nodes);
        if tokens.len() < self.config.min_tokens {
            return FragmentOutcome::Skipped(SkipReason::TooFewTokens(tokens.len()));
        }

        FragmentOutcome::Accepted(FragmentDraft {
            entry,
            document,
            text_nodes,
            tokens,
        })
    }

    /// Parse markup and detach style/script/nav/noscript subtrees
    fn normalize(&self, markup: &str) -> Html {
        let mut document = Html::parse_document(markup);

        if let Some(selector) = &self.noise_selector {
            let noise: Vec<ego_tree::NodeId> = document.select(selector).map(|el| el.id()).collect();
            for id in noise {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                }
            }
        }

        document
    }
}

/// Full text content of the body plus its non-empty text nodes in document order
fn extract_text(document: &Html) -> Result<(String, Vec<String>), ParseError> {
    let body_selector =
        Selector::parse("body").map_err(|e| ParseError::InvalidHtml(format!("{:?}", e)))?;
    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut full_text = String::new();
    let mut text_nodes = Vec::new();
    collect_text(*root, &mut full_text, &mut text_nodes);

    Ok((full_text, text_nodes))
}

fn collect_text(
    node: ego_tree::NodeRef<Node>,
    full_text: &mut String,
    text_nodes: &mut Vec<String>,
) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let raw: &str = text;
                full_text.push_str(raw);
                if !raw.trim().is_empty() {
                    text_nodes.push(raw.to_string());
                }
            }
            Node::Element(_) => collect_text(child, full_text, text_nodes),
            _ => {}
        }
    }
}
