//! In-memory container (for testing and pre-extracted content)

use super::{Container, SpineEntry};
use crate::error::ParseError;

/// Spine entries held as markup strings; `None` content simulates a broken entry
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    entries: Vec<(SpineEntry, Option<String>)>,
    loads: Vec<usize>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a spine entry with the given href and markup
    pub fn with_fragment(mut self, href: &str, markup: impl Into<String>) -> Self {
        let entry = self.next_entry(href);
        self.entries.push((entry, Some(markup.into())));
        self
    }

    /// Append a spine entry whose content cannot be loaded
    pub fn with_broken_fragment(mut self, href: &str) -> Self {
        let entry = self.next_entry(href);
        self.entries.push((entry, None));
        self
    }

    /// Spine indices whose content has been requested, in request order
    pub fn loads(&self) -> &[usize] {
        &self.loads
    }

    fn next_entry(&self, href: &str) -> SpineEntry {
        let idref = href
            .rsplit('/')
            .next()
            .and_then(|name| name.split('.').next())
            .unwrap_or(href)
            .to_string();
        SpineEntry {
            index: self.entries.len(),
            href: Some(href.to_string()),
            idref: Some(idref),
        }
    }
}

impl Container for MemoryContainer {
    fn spine_len(&self) -> usize {
        self.entries.len()
    }

    fn spine_entry(&self, index: usize) -> Option<SpineEntry> {
        self.entries.get(index).map(|(entry, _)| entry.clone())
    }

    fn load(&mut self, entry: &SpineEntry) -> Result<String, ParseError> {
        self.loads.push(entry.index);
        self.entries
            .get(entry.index)
            .and_then(|(_, markup)| markup.clone())
            .ok_or_else(|| {
                ParseError::MissingResource(entry.href.clone().unwrap_or_default())
            })
    }
}
