//! EPUB container backed by the `epub` crate

use super::{Container, SpineEntry};
use crate::error::ParseError;
use epub::doc::EpubDoc;
use std::io::Cursor;

/// EPUB 2/3 container read entirely from memory
pub struct EpubContainer {
    doc: EpubDoc<Cursor<Vec<u8>>>,
}

impl EpubContainer {
    /// Parse the package from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ParseError> {
        let doc = EpubDoc::from_reader(Cursor::new(bytes))
            .map_err(|e| ParseError::InvalidEpub(e.to_string()))?;
        Ok(Self { doc })
    }
}

impl Container for EpubContainer {
    fn spine_len(&self) -> usize {
        self.doc.spine.len()
    }

    fn spine_entry(&self, index: usize) -> Option<SpineEntry> {
        let item = self.doc.spine.get(index)?;
        // manifest paths are archive paths; keep the href relative to the package file
        let href = self
            .doc
            .resources
            .get(&item.idref)
            .map(|resource| {
                let path = &resource.path;
                path.strip_prefix(&self.doc.root_base)
                    .unwrap_or(path.as_path())
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .filter(|href| !href.is_empty());
        let idref = Some(item.idref.clone()).filter(|id| !id.is_empty());

        Some(SpineEntry { index, href, idref })
    }

    fn load(&mut self, entry: &SpineEntry) -> Result<String, ParseError> {
        let id = entry
            .idref
            .as_deref()
            .ok_or_else(|| ParseError::MissingResource(format!("spine entry {}", entry.index)))?;

        self.doc
            .get_resource_str(id)
            .map(|(content, _mime)| content)
            .ok_or_else(|| ParseError::MissingResource(id.to_string()))
    }
}
