//! Core data model: tokens, fragments, loaded books and saved progress

mod book;
mod fragment;
mod progress;
mod token;

pub use book::{BookFingerprint, LoadedBook};
pub use fragment::FragmentRecord;
pub use progress::{SavedProgress, SCHEMA_VERSION};
pub use token::Token;
