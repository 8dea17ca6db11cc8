//! Flowstate CLI - speed-read EPUBs one word at a time

mod commands;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flowstate_core::ReaderConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate a speed argument (must be at least 1)
fn parse_wpm(s: &str) -> Result<u32, String> {
    let n: u32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("wpm must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "flowstate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding saved progress
    #[arg(
        long,
        global = true,
        env = "FLOWSTATE_DATA_DIR",
        default_value = "./flowstate_data"
    )]
    data_dir: PathBuf,

    /// Reader configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Speed-read an EPUB one word at a time
    Read {
        /// Input file path
        input: PathBuf,

        /// Reading speed in words per minute
        #[arg(short, long, value_parser = parse_wpm)]
        wpm: Option<u32>,

        /// Start playing immediately
        #[arg(long)]
        autoplay: bool,

        /// Ignore saved progress and start at the first word
        #[arg(long)]
        from_start: bool,
    },

    /// Display the readable content found in an EPUB
    Info {
        /// Input file path
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or clear saved reading progress
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },
}

#[derive(Subcommand)]
enum ProgressAction {
    /// Show the saved reading position
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the saved reading position
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "flowstate_cli=debug,flowstate_core=debug"
    } else {
        "flowstate_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => ReaderConfig::load(path),
        None => ReaderConfig::default(),
    };

    match cli.command {
        Commands::Read {
            input,
            wpm,
            autoplay,
            from_start,
        } => {
            let options = commands::ReadOptions {
                wpm,
                autoplay,
                from_start,
            };
            commands::read(&input, options, config, &cli.data_dir).await
        }

        Commands::Info { input, json } => commands::info(&input, json, config, &cli.data_dir).await,

        Commands::Progress { action } => match action {
            ProgressAction::Show { json } => commands::progress_show(&cli.data_dir, json).await,
            ProgressAction::Clear => commands::progress_clear(&cli.data_dir).await,
        },
    }
}
