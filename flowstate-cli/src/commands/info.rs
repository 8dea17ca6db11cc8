//! Info command implementation

use super::{display_name, progress_store};
use anyhow::{Context, Result};
use flowstate_core::{BookAssembler, BookFingerprint, ReaderConfig};
use serde::Serialize;
use std::path::Path;

/// Number of leading words shown per fragment
const PREVIEW_WORDS: usize = 8;

/// Book info output
#[derive(Serialize)]
struct BookInfo {
    file: String,
    fingerprint: String,
    spine_items: usize,
    tokens: usize,
    fragments: Vec<FragmentInfo>,
    skipped: Vec<SkippedInfo>,
    saved_cursor: Option<usize>,
}

#[derive(Serialize)]
struct FragmentInfo {
    index: usize,
    locator: Option<String>,
    tokens: usize,
    preview: String,
}

#[derive(Serialize)]
struct SkippedInfo {
    index: usize,
    href: Option<String>,
    reason: String,
}

/// Display the readable content found in an EPUB
pub async fn info(input: &Path, json: bool, config: ReaderConfig, data_dir: &Path) -> Result<()> {
    let name = display_name(input)?;
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let fingerprint = BookFingerprint::new(&name, bytes.len() as u64);

    let assembly = BookAssembler::new(&config)?
        .assemble_bytes(&name, bytes)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let book = &assembly.book;

    let saved_cursor = progress_store(data_dir)
        .load()
        .await
        .filter(|record| record.matches(&fingerprint))
        .map(|record| record.global_cursor);

    let info = BookInfo {
        file: name,
        fingerprint: fingerprint.to_string(),
        spine_items: book.spine_count(),
        tokens: book.len(),
        fragments: book
            .fragments()
            .iter()
            .map(|fragment| FragmentInfo {
                index: fragment.fragment_index,
                locator: fragment.locator().map(str::to_string),
                tokens: fragment.token_count(),
                preview: book
                    .fragment_tokens(fragment)
                    .iter()
                    .take(PREVIEW_WORDS)
                    .map(|token| token.word.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            })
            .collect(),
        skipped: assembly
            .skipped
            .iter()
            .map(|skipped| SkippedInfo {
                index: skipped.index,
                href: skipped.href.clone(),
                reason: skipped.reason.to_string(),
            })
            .collect(),
        saved_cursor,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("File:        {}", info.file);
        println!("Spine items: {}", info.spine_items);
        println!("Words:       {}", info.tokens);
        if let Some(cursor) = info.saved_cursor {
            println!("Saved at:    word {}", cursor + 1);
        }
        println!();
        for fragment in &info.fragments {
            println!(
                "  [{:>3}] {:<40} {:>6} words  {}",
                fragment.index,
                fragment.locator.as_deref().unwrap_or("-"),
                fragment.tokens,
                fragment.preview
            );
        }
        for skipped in &info.skipped {
            println!(
                "  [{:>3}] {:<40} skipped: {}",
                skipped.index,
                skipped.href.as_deref().unwrap_or("-"),
                skipped.reason
            );
        }
    }

    Ok(())
}
