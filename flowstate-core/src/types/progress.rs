//! Persisted reading position

use super::BookFingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version of the persisted record
pub const SCHEMA_VERSION: u32 = 2;

/// The single persisted progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProgress {
    pub schema_version: u32,
    pub book_fingerprint: BookFingerprint,
    pub global_cursor: usize,
    pub speed: u32,
    pub saved_at: DateTime<Utc>,
}

impl SavedProgress {
    /// Create a record stamped with the current schema version
    pub fn new(
        book_fingerprint: BookFingerprint,
        global_cursor: usize,
        speed: u32,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            book_fingerprint,
            global_cursor,
            speed,
            saved_at,
        }
    }

    /// Whether this record was written with the current schema
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }

    /// Whether this record may be used to resume the given book
    pub fn matches(&self, fingerprint: &BookFingerprint) -> bool {
        self.is_current_schema() && &self.book_fingerprint == fingerprint
    }
}
