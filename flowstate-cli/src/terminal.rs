//! Terminal presentation: the current word on an indicatif progress line

use anyhow::Result;
use flowstate_core::{FlowstateError, Position, PresentationSink};
use indicatif::{ProgressBar, ProgressStyle};

/// Renders the reader on a single progress line
pub struct TerminalSink {
    bar: ProgressBar,
    word: String,
    wpm: u32,
    note: String,
}

impl TerminalSink {
    pub fn new(wpm: u32) -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:30.cyan/blue} {pos:>7}/{len:7} {percent:>3}% {msg}")?
                .progress_chars("##-"),
        );

        Ok(Self {
            bar,
            word: String::new(),
            wpm,
            note: String::new(),
        })
    }

    /// Print a line above the progress line
    pub fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line);
    }

    /// Leave the last frame on screen
    pub fn finish(&self) {
        self.bar.finish();
    }

    fn refresh(&self) {
        self.bar.set_message(format!(
            "{:^24} [{} wpm, {}]",
            self.word, self.wpm, self.note
        ));
    }
}

impl PresentationSink for TerminalSink {
    fn word_changed(&mut self, word: &str) {
        self.word = word.to_string();
        self.refresh();
    }

    fn position_changed(&mut self, position: &Position) {
        self.bar.set_length(position.total as u64);
        self.bar.set_position(position.index as u64);
        if let Some(note) = &position.note {
            self.note = note.clone();
        }
        self.refresh();
    }

    fn highlight(&mut self, _index: usize, _scroll_into_view: bool) {
        // no source view in the terminal
    }

    fn load_failed(&mut self, error: &FlowstateError) {
        self.bar
            .abandon_with_message(format!("Failed to load book: {}", error));
    }

    fn status_changed(&mut self, status: &str) {
        self.bar.println(status);
    }

    fn speed_changed(&mut self, wpm: u32) {
        self.wpm = wpm;
        self.refresh();
    }
}
