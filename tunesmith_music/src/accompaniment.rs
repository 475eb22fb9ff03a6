// Deterministic accompaniment parts: bass, arpeggio and sustained chord pads.
//
// None of these use randomness. Each emits material for one bar per chord,
// with bar `i` starting at `4.0 * i` quarter notes.

use crate::event::{BEATS_PER_BAR, TimedEvent, bar_start};
use crate::harmony::Chord;
use tracing::debug;

/// Four quarter notes per bar on the chord root, one octave down.
pub fn bass_line(progression: &[Chord]) -> Vec<TimedEvent> {
    let mut out = Vec::with_capacity(progression.len() * 4);
    for (bar, chord) in progression.iter().enumerate() {
        let start = bar_start(bar);
        let pitch = chord.root - 12;
        for beat in 0..4 {
            out.push(TimedEvent::new(pitch, start + beat as f64, 1.0));
        }
    }
    debug!(notes = out.len(), "generated bass");
    out
}

/// Four quarter notes per bar walking up the chord one octave higher,
/// wrapping back to the root when the chord has fewer than four tones.
pub fn arpeggio(progression: &[Chord]) -> Vec<TimedEvent> {
    let mut out = Vec::with_capacity(progression.len() * 4);
    for (bar, chord) in progression.iter().enumerate() {
        let tones = chord.pitches(0);
        if tones.is_empty() {
            continue;
        }
        let start = bar_start(bar);
        for beat in 0..4 {
            let pitch = tones[beat % tones.len()] + 12;
            out.push(TimedEvent::new(pitch, start + beat as f64, 1.0));
        }
    }
    debug!(notes = out.len(), "generated arpeggio");
    out
}

/// Whole-bar chord pads, every member two octaves above the chord's
/// written position.
pub fn chord_pads(progression: &[Chord]) -> Vec<TimedEvent> {
    let mut out = Vec::new();
    for (bar, chord) in progression.iter().enumerate() {
        let start = bar_start(bar);
        for pitch in chord.pitches(1) {
            out.push(TimedEvent::new(pitch + 12, start, BEATS_PER_BAR));
        }
    }
    debug!(notes = out.len(), "generated chord pads");
    out
}
