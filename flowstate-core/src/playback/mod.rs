//! Timed playback: the scheduler state machine and the timers that drive it

mod scheduler;
mod timer;

pub use scheduler::{interval_for, Effect, PersistReason, PlaybackState, Scheduler};
pub use timer::{ManualTimer, Ticket, Timer, TokioTimer};
