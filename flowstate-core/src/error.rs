//! Error types for Flowstate Core

use thiserror::Error;

/// Result type alias using FlowstateError
pub type Result<T> = std::result::Result<T, FlowstateError>;

/// Top-level error type for all Flowstate operations
#[derive(Debug, Error)]
pub enum FlowstateError {
    /// Input rejected before any parsing started
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Every spine entry was skipped; no book was produced
    #[error("No readable text found across the spine")]
    NoReadableContent,

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while opening a container or reading its fragments
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("Invalid HTML: {0}")]
    InvalidHtml(String),

    #[error("Missing resource: {0}")]
    MissingResource(String),
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
