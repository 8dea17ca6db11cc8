//! Progress store: the single persisted reading position
//!
//! Every save fully replaces the previous record. Anything unreadable on the
//! way back in (missing, corrupt, written by another schema version) is
//! treated as "no saved progress" and never surfaces as an error.

use crate::error::StorageError;
use crate::storage::{MemoryStorage, StorageProvider, StorageResult};
use crate::types::{BookFingerprint, SavedProgress, SCHEMA_VERSION};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fixed, versioned key of the progress record
pub const PROGRESS_KEY: &str = "flowstate.progress.v2.json";

/// Reads and writes [`SavedProgress`] through a storage provider
#[derive(Clone)]
pub struct ProgressStore {
    storage: Arc<dyn StorageProvider>,
    key: String,
}

impl ProgressStore {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            storage,
            key: PROGRESS_KEY.to_string(),
        }
    }

    /// Store backed by process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the stored record with a fresh one stamped now
    pub async fn save(
        &self,
        fingerprint: &BookFingerprint,
        cursor: usize,
        speed: u32,
    ) -> StorageResult<SavedProgress> {
        let record = SavedProgress::new(fingerprint.clone(), cursor, speed, Utc::now());
        self.save_record(&record).await?;
        Ok(record)
    }

    /// Replace the stored record
    pub async fn save_record(&self, record: &SavedProgress) -> StorageResult<()> {
        let data = serde_json::to_vec_pretty(record)?;
        self.storage.write(&self.key, data).await?;
        debug!(
            fingerprint = %record.book_fingerprint,
            cursor = record.global_cursor,
            speed = record.speed,
            "Saved progress"
        );
        Ok(())
    }

    /// The stored record, if one exists with the current schema version
    pub async fn load(&self) -> Option<SavedProgress> {
        match self.storage.exists(&self.key).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(key = %self.key, "No saved progress");
                return None;
            }
            Err(err) => {
                warn!(key = %self.key, "Failed to check for saved progress: {err}");
                return None;
            }
        }

        let data = match self.storage.read(&self.key).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => return None,
            Err(err) => {
                warn!(key = %self.key, "Failed to read saved progress: {err}");
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_slice(&data) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %self.key, "Ignoring corrupt progress record: {err}");
                return None;
            }
        };

        let version = value.get("schemaVersion").and_then(|v| v.as_u64());
        if version != Some(u64::from(SCHEMA_VERSION)) {
            debug!(?version, "Ignoring progress record from another schema version");
            return None;
        }

        match serde_json::from_value::<SavedProgress>(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(key = %self.key, "Ignoring malformed progress record: {err}");
                None
            }
        }
    }

    /// Whether a valid record exists for this book
    pub async fn is_resumable(&self, fingerprint: &BookFingerprint) -> bool {
        self.load()
            .await
            .is_some_and(|record| record.matches(fingerprint))
    }

    /// Remove the stored record; returns whether one existed
    pub async fn clear(&self) -> StorageResult<bool> {
        match self.storage.delete(&self.key).await {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
