//! CLI command implementations

mod info;
mod progress;
mod read;

pub use info::info;
pub use progress::{progress_clear, progress_show};
pub use read::{read, ReadOptions};

use flowstate_core::{LocalStorage, ProgressStore};
use std::path::Path;
use std::sync::Arc;

/// Progress store rooted at the data directory
fn progress_store(data_dir: &Path) -> ProgressStore {
    ProgressStore::new(Arc::new(LocalStorage::new(data_dir)))
}

/// Display name of an input path: its final component
fn display_name(input: &Path) -> anyhow::Result<String> {
    use anyhow::Context;

    input
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("Input path has no file name: {}", input.display()))
}
