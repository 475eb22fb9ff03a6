// Timed events: the common output of every part generator.
//
// Times are in quarter notes from the start of the piece (bar `b` of 4/4
// starts at `4.0 * b`). Events are immutable once built; generators emit
// them in start order within a part but nothing downstream relies on that:
// the MIDI writer and renderer sort for themselves.

use crate::theory::Note;
use serde::{Deserialize, Serialize};

/// Quarter notes per 4/4 bar.
pub const BEATS_PER_BAR: f64 = 4.0;

/// General MIDI percussion keys used by the drum generator.
pub mod drum {
    pub const KICK: i32 = 36;
    pub const SNARE: i32 = 38;
    pub const CLOSED_HAT: i32 = 42;
    pub const OPEN_HAT: i32 = 46;
}

/// One note or drum hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub pitch: i32,
    /// Start, in quarter notes.
    pub start: f64,
    /// Length, in quarter notes.
    pub duration: f64,
}

impl TimedEvent {
    pub fn new(pitch: i32, start: f64, duration: f64) -> Self {
        TimedEvent { pitch, start, duration }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn note(&self) -> Note {
        Note::new(self.pitch)
    }
}

/// Copy of `events` ordered by start time (stable for equal starts).
pub fn sorted_by_start(events: &[TimedEvent]) -> Vec<TimedEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));
    sorted
}

/// Start offset of bar `index`.
pub fn bar_start(index: usize) -> f64 {
    index as f64 * BEATS_PER_BAR
}
