//! Flowstate Core Library
//!
//! This crate turns a packaged e-book into one whole-book word sequence and
//! plays it back one word at a time. Spine entries are loaded, cleaned,
//! filtered and tokenized in reading order by the [`BookAssembler`]; a
//! [`ReaderSession`] drives the playback scheduler over the result and keeps
//! the reading position in a [`ProgressStore`].

pub mod assembler;
pub mod config;
pub mod container;
pub mod error;
pub mod filter;
pub mod loader;
pub mod playback;
pub mod session;
pub mod sink;
pub mod storage;
pub mod store;
pub mod tokenizer;
pub mod types;

pub use assembler::{Assembly, BookAssembler, SkippedFragment};
pub use config::{FilterConfig, FragmentConfig, PlaybackConfig, ReaderConfig};
pub use container::{Container, EpubContainer, MemoryContainer, SpineEntry};
pub use error::{FlowstateError, ParseError, Result, StorageError};
pub use filter::{clean_text, ContentFilter, Rejection};
pub use loader::{FragmentLoader, SkipReason};
pub use playback::{
    Effect, ManualTimer, PersistReason, PlaybackState, Scheduler, Ticket, Timer, TokioTimer,
};
pub use session::{LoadSummary, ReaderSession};
pub use sink::{Position, PresentationSink, RecordingSink, SinkEvent};
pub use storage::{LocalStorage, MemoryStorage, StorageProvider};
pub use store::{ProgressStore, PROGRESS_KEY};
pub use tokenizer::tokenize;
pub use types::{BookFingerprint, FragmentRecord, LoadedBook, SavedProgress, Token};
