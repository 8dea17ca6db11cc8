//! Playback scheduler: a timed state machine over the global cursor
//!
//! The scheduler never touches timers, storage or rendering directly. Each
//! operation mutates its own state and returns the [`Effect`]s the caller
//! must apply, in order. At most one advance is outstanding at any moment:
//! every path that leaves `Playing` or changes the interval emits a
//! [`Effect::Cancel`] for the pending ticket before anything else.

use super::timer::Ticket;
use crate::config::PlaybackConfig;
use std::fmt;
use std::time::Duration;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No book loaded
    Idle,
    /// Book loaded, cursor fixed
    Paused,
    /// Exactly one scheduled advance is outstanding
    Playing,
}

/// Why progress is being persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistReason {
    Pause,
    Seek,
    Rewind,
    Restart,
    Finished,
    Quit,
}

impl PersistReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistReason::Pause => "pause",
            PersistReason::Seek => "seek",
            PersistReason::Rewind => "rewind",
            PersistReason::Restart => "restart",
            PersistReason::Finished => "finished",
            PersistReason::Quit => "quit",
        }
    }
}

impl fmt::Display for PersistReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side effects requested by a scheduler operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Arm a timer that should deliver `ticket` after `delay`
    Schedule { ticket: Ticket, delay: Duration },

    /// Disarm the timer for `ticket`
    Cancel { ticket: Ticket },

    /// Show the word at `cursor`
    Render { cursor: usize, scroll_into_view: bool },

    /// Save the current position and speed
    Persist {
        reason: PersistReason,
        cursor: usize,
        speed: u32,
    },
}

/// Tick interval for a speed: `max(min_interval, round(60000 / wpm))` ms
pub fn interval_for(wpm: u32, min_interval_ms: u64) -> Duration {
    let wpm = u64::from(wpm.max(1));
    let ms = (60_000 + wpm / 2) / wpm;
    Duration::from_millis(ms.max(min_interval_ms))
}

/// Single-threaded playback state machine
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: PlaybackConfig,
    state: PlaybackState,
    cursor: Option<usize>,
    len: usize,
    speed: u32,
    pending: Option<Ticket>,
    next_ticket: u64,
}

impl Scheduler {
    pub fn new(config: PlaybackConfig) -> Self {
        let speed = config.normalize_wpm(config.default_wpm);
        Self {
            config,
            state: PlaybackState::Idle,
            cursor: None,
            len: 0,
            speed,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Current global cursor; `None` while idle
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Speed in words per minute
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Number of tokens in the loaded sequence
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The outstanding advance, if any
    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    /// Interval at the current speed
    pub fn interval(&self) -> Duration {
        interval_for(self.speed, self.config.min_interval_ms)
    }

    /// Attach a token sequence and park the cursor
    pub fn load(&mut self, len: usize, cursor: usize) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        self.len = len;

        if len == 0 {
            self.state = PlaybackState::Idle;
            self.cursor = None;
            return effects;
        }

        let cursor = self.clamp(cursor);
        self.state = PlaybackState::Paused;
        self.cursor = Some(cursor);
        effects.push(Effect::Render {
            cursor,
            scroll_into_view: true,
        });
        effects
    }

    /// Drop the token sequence
    pub fn unload(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        self.state = PlaybackState::Idle;
        self.cursor = None;
        self.len = 0;
        effects
    }

    pub fn play(&mut self) -> Vec<Effect> {
        let Some(cursor) = self.cursor else {
            return Vec::new();
        };
        if self.state != PlaybackState::Paused || self.len == 0 {
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.state = PlaybackState::Playing;
        effects.push(Effect::Render {
            cursor,
            scroll_into_view: false,
        });
        self.schedule_next(&mut effects);
        effects
    }

    pub fn pause(&mut self) -> Vec<Effect> {
        let Some(cursor) = self.cursor else {
            return Vec::new();
        };
        if self.state != PlaybackState::Playing {
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        self.state = PlaybackState::Paused;
        effects.push(Effect::Render {
            cursor,
            scroll_into_view: true,
        });
        effects.push(self.persist(PersistReason::Pause));
        effects
    }

    pub fn toggle(&mut self) -> Vec<Effect> {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.play(),
            PlaybackState::Idle => Vec::new(),
        }
    }

    /// Jump to a global index, clamped into the sequence
    pub fn seek(&mut self, target: usize) -> Vec<Effect> {
        self.jump(target, PersistReason::Seek)
    }

    /// Step back `count` words (clamped to the configured bounds), stopping at 0
    pub fn rewind(&mut self, count: usize) -> Vec<Effect> {
        let Some(cursor) = self.cursor else {
            return Vec::new();
        };
        let count = self.config.clamp_rewind(count);
        self.jump(cursor.saturating_sub(count), PersistReason::Rewind)
    }

    pub fn restart(&mut self) -> Vec<Effect> {
        self.jump(0, PersistReason::Restart)
    }

    /// Change speed; a pending advance is re-armed at the new interval
    pub fn set_speed(&mut self, wpm: u32) -> Vec<Effect> {
        self.speed = self.config.normalize_wpm(wpm);

        let mut effects = Vec::new();
        if self.state == PlaybackState::Playing {
            self.cancel_pending(&mut effects);
            self.schedule_next(&mut effects);
        }
        effects
    }

    /// Restore a saved position and speed, leaving playback paused
    pub fn resume_to(&mut self, cursor: usize, wpm: u32) -> Vec<Effect> {
        if self.state == PlaybackState::Idle {
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        self.state = PlaybackState::Paused;
        self.speed = self.config.normalize_wpm(wpm);
        let cursor = self.clamp(cursor);
        self.cursor = Some(cursor);
        effects.push(Effect::Render {
            cursor,
            scroll_into_view: true,
        });
        effects
    }

    /// Handle a fired timer
    ///
    /// Tickets other than the pending one are stale and ignored.
    pub fn on_tick(&mut self, ticket: Ticket) -> Vec<Effect> {
        if self.pending != Some(ticket) {
            return Vec::new();
        }
        self.pending = None;

        let Some(cursor) = self.cursor else {
            return Vec::new();
        };
        if self.state != PlaybackState::Playing {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if cursor + 1 >= self.len {
            self.state = PlaybackState::Paused;
            effects.push(Effect::Render {
                cursor,
                scroll_into_view: true,
            });
            effects.push(self.persist(PersistReason::Finished));
            return effects;
        }

        let cursor = cursor + 1;
        self.cursor = Some(cursor);
        effects.push(Effect::Render {
            cursor,
            scroll_into_view: false,
        });
        self.schedule_next(&mut effects);
        effects
    }

    /// Stop playback and persist the position before shutting down
    pub fn close(&mut self) -> Vec<Effect> {
        if self.state == PlaybackState::Idle {
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        self.state = PlaybackState::Paused;
        effects.push(self.persist(PersistReason::Quit));
        effects
    }

    fn jump(&mut self, target: usize, reason: PersistReason) -> Vec<Effect> {
        if self.state == PlaybackState::Idle {
            return Vec::new();
        }

        let was_playing = self.state == PlaybackState::Playing;
        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        self.state = PlaybackState::Paused;

        let cursor = self.clamp(target);
        self.cursor = Some(cursor);
        effects.push(Effect::Render {
            cursor,
            scroll_into_view: true,
        });
        effects.push(self.persist(reason));

        if was_playing {
            self.state = PlaybackState::Playing;
            self.schedule_next(&mut effects);
        }
        effects
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.len.saturating_sub(1))
    }

    fn persist(&self, reason: PersistReason) -> Effect {
        Effect::Persist {
            reason,
            cursor: self.cursor.unwrap_or_default(),
            speed: self.speed,
        }
    }

    fn cancel_pending(&mut self, effects: &mut Vec<Effect>) {
        if let Some(ticket) = self.pending.take() {
            effects.push(Effect::Cancel { ticket });
        }
    }

    fn schedule_next(&mut self, effects: &mut Vec<Effect>) {
        debug_assert!(self.pending.is_none(), "advance already outstanding");
        self.next_ticket += 1;
        let ticket = Ticket::new(self.next_ticket);
        self.pending = Some(ticket);
        effects.push(Effect::Schedule {
            ticket,
            delay: self.interval(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(len: usize) -> Scheduler {
        let mut s = Scheduler::new(PlaybackConfig::default());
        s.load(len, 0);
        s
    }

    fn scheduled_ticket(effects: &[Effect]) -> Ticket {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Schedule { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .expect("expected a Schedule effect")
    }

    #[test]
    fn test_interval_for_speeds() {
        assert_eq!(interval_for(300, 10), Duration::from_millis(200));
        assert_eq!(interval_for(120, 10), Duration::from_millis(500));
        assert_eq!(interval_for(900, 10), Duration::from_millis(67));
        assert_eq!(interval_for(60_000, 10), Duration::from_millis(10));
    }

    #[test]
    fn test_new_scheduler_is_idle() {
        let mut s = Scheduler::new(PlaybackConfig::default());
        assert_eq!(s.state(), PlaybackState::Idle);
        assert_eq!(s.cursor(), None);
        assert!(s.play().is_empty());
        assert!(s.seek(3).is_empty());
        assert_eq!(s.speed(), 300);
    }

    #[test]
    fn test_inverted_speed_bounds_do_not_panic() {
        let mut s = Scheduler::new(PlaybackConfig {
            min_wpm: 900,
            max_wpm: 120,
            ..PlaybackConfig::default()
        });
        assert_eq!(s.speed(), 300);
        s.set_speed(5000);
        assert_eq!(s.speed(), 900);
    }

    #[test]
    fn test_load_clamps_cursor_and_pauses() {
        let mut s = Scheduler::new(PlaybackConfig::default());
        let effects = s.load(10, 50);
        assert_eq!(s.state(), PlaybackState::Paused);
        assert_eq!(s.cursor(), Some(9));
        assert_eq!(
            effects,
            vec![Effect::Render {
                cursor: 9,
                scroll_into_view: true
            }]
        );
    }

    #[test]
    fn test_play_schedules_one_advance() {
        let mut s = scheduler(5);
        let effects = s.play();
        assert!(s.is_playing());
        assert_eq!(
            effects[1],
            Effect::Schedule {
                ticket: scheduled_ticket(&effects),
                delay: Duration::from_millis(200)
            }
        );
        // already playing: no-op
        assert!(s.play().is_empty());
    }

    #[test]
    fn test_tick_advances_and_reschedules() {
        let mut s = scheduler(5);
        let ticket = scheduled_ticket(&s.play());
        let effects = s.on_tick(ticket);

        assert_eq!(s.cursor(), Some(1));
        assert!(matches!(effects[0], Effect::Render { cursor: 1, .. }));
        assert_ne!(scheduled_ticket(&effects), ticket);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut s = scheduler(5);
        let ticket = scheduled_ticket(&s.play());
        s.pause();
        assert!(s.on_tick(ticket).is_empty());
        assert_eq!(s.cursor(), Some(0));
    }

    #[test]
    fn test_tick_at_last_index_finishes() {
        let mut s = scheduler(2);
        let first = scheduled_ticket(&s.play());
        let second = scheduled_ticket(&s.on_tick(first));
        let effects = s.on_tick(second);

        assert_eq!(s.state(), PlaybackState::Paused);
        assert_eq!(s.cursor(), Some(1));
        assert_eq!(s.pending(), None);
        assert!(effects.contains(&Effect::Persist {
            reason: PersistReason::Finished,
            cursor: 1,
            speed: 300
        }));
    }

    #[test]
    fn test_pause_cancels_and_persists() {
        let mut s = scheduler(5);
        let ticket = scheduled_ticket(&s.play());
        let effects = s.pause();

        assert_eq!(effects[0], Effect::Cancel { ticket });
        assert!(matches!(
            effects.last(),
            Some(Effect::Persist {
                reason: PersistReason::Pause,
                ..
            })
        ));
        // pausing while paused does nothing
        assert!(s.pause().is_empty());
    }

    #[test]
    fn test_seek_while_playing_resumes() {
        let mut s = scheduler(100);
        let ticket = scheduled_ticket(&s.play());
        let effects = s.seek(500);

        assert_eq!(s.cursor(), Some(99));
        assert!(s.is_playing());
        assert_eq!(effects[0], Effect::Cancel { ticket });
        assert!(matches!(
            effects[2],
            Effect::Persist {
                reason: PersistReason::Seek,
                cursor: 99,
                ..
            }
        ));
        assert!(matches!(effects[3], Effect::Schedule { .. }));
    }

    #[test]
    fn test_seek_while_paused_stays_paused() {
        let mut s = scheduler(100);
        let effects = s.seek(42);
        assert_eq!(s.cursor(), Some(42));
        assert_eq!(s.state(), PlaybackState::Paused);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::Schedule { .. } | Effect::Cancel { .. })));
    }

    #[test]
    fn test_rewind_clamps_at_zero() {
        let mut s = scheduler(100);
        s.seek(5);
        s.rewind(10);
        assert_eq!(s.cursor(), Some(0));
    }

    #[test]
    fn test_rewind_zero_steps_back_one() {
        let mut s = scheduler(100);
        s.seek(5);
        s.rewind(0);
        assert_eq!(s.cursor(), Some(4));
    }

    #[test]
    fn test_restart_preserves_play_state() {
        let mut s = scheduler(100);
        s.seek(40);
        s.play();
        s.restart();
        assert_eq!(s.cursor(), Some(0));
        assert!(s.is_playing());
    }

    #[test]
    fn test_speed_change_rearms_pending_advance() {
        let mut s = scheduler(100);
        let old = scheduled_ticket(&s.play());
        let effects = s.set_speed(600);

        assert_eq!(effects[0], Effect::Cancel { ticket: old });
        assert!(matches!(
            effects[1],
            Effect::Schedule { delay, .. } if delay == Duration::from_millis(100)
        ));
    }

    #[test]
    fn test_speed_change_while_paused_is_silent() {
        let mut s = scheduler(100);
        assert!(s.set_speed(333).is_empty());
        assert_eq!(s.speed(), 330);
    }

    #[test]
    fn test_resume_to_snaps_speed_and_pauses() {
        let mut s = scheduler(100);
        s.play();
        let effects = s.resume_to(250, 1234);
        assert_eq!(s.state(), PlaybackState::Paused);
        assert_eq!(s.cursor(), Some(99));
        assert_eq!(s.speed(), 900);
        assert!(!effects.iter().any(|e| matches!(e, Effect::Persist { .. })));
    }

    #[test]
    fn test_unload_cancels_pending() {
        let mut s = scheduler(10);
        let ticket = scheduled_ticket(&s.play());
        assert_eq!(s.unload(), vec![Effect::Cancel { ticket }]);
        assert_eq!(s.state(), PlaybackState::Idle);
        assert_eq!(s.cursor(), None);
    }

    #[test]
    fn test_close_persists_quit() {
        let mut s = scheduler(10);
        s.seek(3);
        let effects = s.close();
        assert_eq!(
            effects,
            vec![Effect::Persist {
                reason: PersistReason::Quit,
                cursor: 3,
                speed: 300
            }]
        );
    }
}
