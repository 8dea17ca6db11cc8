//! Read command implementation

use super::{display_name, progress_store};
use crate::terminal::TerminalSink;
use anyhow::{Context, Result};
use flowstate_core::{PlaybackState, ReaderConfig, ReaderSession, TokioTimer};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Options for the read command
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub wpm: Option<u32>,
    pub autoplay: bool,
    pub from_start: bool,
}

const HELP: &str = "Commands: <enter>/p toggle, play, pause, r [N] rewind, s N seek to word N, \
                    w N speed, +/- speed step, restart, resume, q quit";

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReaderCommand {
    Toggle,
    Play,
    Pause,
    Rewind(Option<usize>),
    /// 1-based word number
    Seek(usize),
    Speed(u32),
    Faster,
    Slower,
    Restart,
    Resume,
    Help,
    Quit,
}

impl ReaderCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();

        let number = |name: &str| -> Result<usize, String> {
            let raw = arg.ok_or_else(|| format!("{} needs a number", name))?;
            raw.parse()
                .map_err(|_| format!("'{}' is not a valid number", raw))
        };

        match command.as_str() {
            "" | "p" | "toggle" => Ok(Self::Toggle),
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "r" | "rewind" => match arg {
                Some(_) => number("rewind").map(|n| Self::Rewind(Some(n))),
                None => Ok(Self::Rewind(None)),
            },
            "s" | "seek" => number("seek").map(Self::Seek),
            "w" | "wpm" => number("wpm").map(|n| Self::Speed(n.min(u32::MAX as usize) as u32)),
            "+" => Ok(Self::Faster),
            "-" => Ok(Self::Slower),
            "restart" => Ok(Self::Restart),
            "resume" => Ok(Self::Resume),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command '{}'", other)),
        }
    }
}

/// Speed-read an EPUB, taking commands from stdin
///
/// Playback keeps going after stdin closes and the command returns once
/// playback is paused or finished.
pub async fn read(
    input: &Path,
    options: ReadOptions,
    config: ReaderConfig,
    data_dir: &Path,
) -> Result<()> {
    let name = display_name(input)?;
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let size = bytes.len() as u64;

    let rewind_default = config.playback.default_rewind;
    let wpm_step = config.playback.wpm_step;
    let (timer, mut ticks) = TokioTimer::new();
    let sink = TerminalSink::new(config.playback.normalize_wpm(config.playback.default_wpm))?;
    let mut session = ReaderSession::new(config, timer, sink, progress_store(data_dir))?;

    let summary = session
        .load_book(bytes, &name, size)
        .await
        .with_context(|| format!("Failed to load {}", input.display()))?;

    println!(
        "Loaded {}: {} words from {} of {} spine items",
        summary.display_name,
        summary.tokens,
        summary.fragments,
        summary.spine_count
    );
    for skipped in &summary.skipped {
        debug!(index = skipped.index, href = ?skipped.href, reason = %skipped.reason, "Skipped");
    }

    if options.from_start {
        session.restart().await;
    } else if let Some(cursor) = summary.resumed_at {
        println!("Resuming at word {}", cursor + 1);
    }
    if let Some(wpm) = options.wpm {
        session.set_speed(wpm).await;
    }
    if options.autoplay {
        session.play().await;
    }
    session.sink().println(HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            Some(ticket) = ticks.recv() => {
                session.on_tick(ticket).await;
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    debug!("stdin closed");
                    stdin_open = false;
                    if session.state() != PlaybackState::Playing {
                        break;
                    }
                    continue;
                };

                match ReaderCommand::parse(&line) {
                    Ok(ReaderCommand::Quit) => break,
                    Ok(ReaderCommand::Toggle) => session.toggle_play_pause().await,
                    Ok(ReaderCommand::Play) => session.play().await,
                    Ok(ReaderCommand::Pause) => session.pause().await,
                    Ok(ReaderCommand::Rewind(count)) => {
                        session.rewind(count.unwrap_or(rewind_default)).await
                    }
                    Ok(ReaderCommand::Seek(word)) => session.seek(word.saturating_sub(1)).await,
                    Ok(ReaderCommand::Speed(wpm)) => {
                        session.set_speed(wpm).await;
                    }
                    Ok(ReaderCommand::Faster) => {
                        let wpm = session.speed().saturating_add(wpm_step);
                        session.set_speed(wpm).await;
                    }
                    Ok(ReaderCommand::Slower) => {
                        let wpm = session.speed().saturating_sub(wpm_step);
                        session.set_speed(wpm).await;
                    }
                    Ok(ReaderCommand::Restart) => session.restart().await,
                    Ok(ReaderCommand::Resume) => {
                        if !session.resume_saved().await {
                            session.sink().println("No saved progress for this book");
                        }
                    }
                    Ok(ReaderCommand::Help) => session.sink().println(HELP),
                    Err(message) => session.sink().println(message),
                }
            }
            else => break,
        }

        if !stdin_open && session.state() != PlaybackState::Playing {
            break;
        }
    }

    session.close().await;
    session.sink().finish();

    let cursor = session.cursor().unwrap_or_default();
    let total = session.book().map_or(0, |book| book.len());
    info!(cursor, total, speed = session.speed(), "Stopped reading");
    println!("Stopped at word {}/{}", cursor + 1, total);

    Ok(())
}
