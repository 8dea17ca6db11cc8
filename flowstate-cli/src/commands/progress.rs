//! Progress command implementations

use super::progress_store;
use anyhow::{Context, Result};
use std::path::Path;

/// Show the saved reading position
pub async fn progress_show(data_dir: &Path, json: bool) -> Result<()> {
    let store = progress_store(data_dir);
    let Some(record) = store.load().await else {
        if json {
            println!("null");
        } else {
            println!("No saved progress");
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Book:     {}", record.book_fingerprint);
        println!("Word:     {}", record.global_cursor + 1);
        println!("Speed:    {} wpm", record.speed);
        println!("Saved at: {}", record.saved_at.to_rfc3339());
        println!("File:     {}", data_dir.join(store.key()).display());
    }

    Ok(())
}

/// Forget the saved reading position
pub async fn progress_clear(data_dir: &Path) -> Result<()> {
    let removed = progress_store(data_dir)
        .clear()
        .await
        .context("Failed to clear saved progress")?;

    if removed {
        println!("Cleared saved progress");
    } else {
        println!("No saved progress to clear");
    }
    Ok(())
}
