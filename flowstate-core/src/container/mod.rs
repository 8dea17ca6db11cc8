//! Containers yield the ordered content fragments of a packaged book

mod epub;
mod memory;

pub use self::epub::EpubContainer;
pub use memory::MemoryContainer;

use crate::error::{FlowstateError, ParseError};

/// One spine entry, inspectable before its content is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineEntry {
    /// Position in spine (reading) order
    pub index: usize,

    /// Path of the fragment inside the container
    pub href: Option<String>,

    /// Manifest id referenced by the spine
    pub idref: Option<String>,
}

impl SpineEntry {
    /// Case-folded href and idref joined for name-based filtering
    pub fn folded_name(&self) -> String {
        format!(
            "{} {}",
            self.href.as_deref().unwrap_or_default(),
            self.idref.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Source of spine-ordered markup fragments
pub trait Container {
    /// Number of entries in the spine
    fn spine_len(&self) -> usize;

    /// Identifiers of one spine entry, without loading its content
    fn spine_entry(&self, index: usize) -> Option<SpineEntry>;

    /// Load the markup of one spine entry
    fn load(&mut self, entry: &SpineEntry) -> Result<String, ParseError>;
}

/// File extensions accepted as book containers
pub const SUPPORTED_EXTENSIONS: &[&str] = &["epub"];

/// Check the display name before paying for any parsing
pub fn validate_display_name(display_name: &str) -> Result<(), FlowstateError> {
    let lower = display_name.to_lowercase();
    let supported = SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)));

    if supported {
        Ok(())
    } else {
        Err(FlowstateError::InvalidInput(format!(
            "{} is not an .epub file",
            display_name
        )))
    }
}

/// Open the container matching a display name
pub fn open_container(
    display_name: &str,
    bytes: Vec<u8>,
) -> Result<Box<dyn Container>, FlowstateError> {
    validate_display_name(display_name)?;
    Ok(Box::new(EpubContainer::from_bytes(bytes)?))
}
