//! Presentation sink: where a reader session sends what should be shown

use crate::error::FlowstateError;
use std::sync::Arc;

/// Reading position as presented to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    /// Spine index of the fragment holding the current word
    pub fragment_index: usize,

    /// href (or idref) of that fragment
    pub fragment_ref: Option<Arc<str>>,

    /// 1-based word index
    pub index: usize,

    /// Total number of words
    pub total: usize,

    /// `round(index / total * 100)`
    pub percent: u32,

    /// Short annotation: "playing", "paused", a persist reason, ...
    pub note: Option<String>,
}

impl Position {
    pub fn new(
        fragment_index: usize,
        fragment_ref: Option<Arc<str>>,
        cursor: usize,
        total: usize,
    ) -> Self {
        let index = cursor + 1;
        let percent = if total == 0 {
            0
        } else {
            ((index as f64 / total as f64) * 100.0).round() as u32
        };

        Self {
            fragment_index,
            fragment_ref,
            index,
            total,
            percent,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Receives render events from a reader session
pub trait PresentationSink {
    /// The current word changed
    fn word_changed(&mut self, word: &str);

    /// The reading position changed
    fn position_changed(&mut self, position: &Position);

    /// Token `index` should be highlighted in the source view
    fn highlight(&mut self, index: usize, scroll_into_view: bool);

    /// Loading a book failed; no book is loaded
    fn load_failed(&mut self, error: &FlowstateError);

    /// Free-form status line
    fn status_changed(&mut self, _status: &str) {}

    /// Playback controls became usable or unusable
    fn controls_changed(&mut self, _enabled: bool) {}

    /// Whether a saved position exists for the loaded book
    fn resume_available(&mut self, _available: bool) {}

    /// The effective speed changed
    fn speed_changed(&mut self, _wpm: u32) {}
}

/// One recorded sink call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Word(String),
    Position(Position),
    Highlight { index: usize, scroll_into_view: bool },
    LoadFailed(String),
    Status(String),
    Controls(bool),
    ResumeAvailable(bool),
    Speed(u32),
}

/// Sink that records every event, for tests and headless drivers
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Words shown, in order
    pub fn words(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Word(word) => Some(word.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_position(&self) -> Option<&Position> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::Position(position) => Some(position),
            _ => None,
        })
    }

    pub fn last_status(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::Status(status) => Some(status.as_str()),
            _ => None,
        })
    }

    pub fn controls_enabled(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::Controls(enabled) => Some(*enabled),
            _ => None,
        })
    }

    /// Notes attached to position events, in order
    pub fn notes(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Position(Position { note: Some(n), .. }) => Some(n.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PresentationSink for RecordingSink {
    fn word_changed(&mut self, word: &str) {
        self.events.push(SinkEvent::Word(word.to_string()));
    }

    fn position_changed(&mut self, position: &Position) {
        self.events.push(SinkEvent::Position(position.clone()));
    }

    fn highlight(&mut self, index: usize, scroll_into_view: bool) {
        self.events.push(SinkEvent::Highlight {
            index,
            scroll_into_view,
        });
    }

    fn load_failed(&mut self, error: &FlowstateError) {
        self.events.push(SinkEvent::LoadFailed(error.to_string()));
    }

    fn status_changed(&mut self, status: &str) {
        self.events.push(SinkEvent::Status(status.to_string()));
    }

    fn controls_changed(&mut self, enabled: bool) {
        self.events.push(SinkEvent::Controls(enabled));
    }

    fn resume_available(&mut self, available: bool) {
        self.events.push(SinkEvent::ResumeAvailable(available));
    }

    fn speed_changed(&mut self, wpm: u32) {
        self.events.push(SinkEvent::Speed(wpm));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_percent() {
        assert_eq!(Position::new(0, None, 0, 200).percent, 1);
        assert_eq!(Position::new(0, None, 99, 200).percent, 50);
        assert_eq!(Position::new(0, None, 199, 200).percent, 100);
        assert_eq!(Position::new(0, None, 0, 3).percent, 33);
    }

    #[test]
    fn test_position_is_one_based() {
        let position = Position::new(4, Some(Arc::from("ch4.xhtml")), 0, 10).with_note("ready");
        assert_eq!(position.index, 1);
        assert_eq!(position.note.as_deref(), Some("ready"));
    }

    #[test]
    fn test_recording_sink_helpers() {
        let mut sink = RecordingSink::new();
        sink.word_changed("Hello");
        sink.position_changed(&Position::new(0, None, 0, 2).with_note("paused"));
        sink.word_changed("world.");
        sink.controls_changed(true);

        assert_eq!(sink.words(), vec!["Hello", "world."]);
        assert_eq!(sink.notes(), vec!["paused"]);
        assert_eq!(sink.controls_enabled(), Some(true));
        assert_eq!(sink.last_position().map(|p| p.total), Some(2));
    }
}
