// Text diagnostics for a generated arrangement.
//
// Everything here returns a `String`; `main` decides where it goes. The
// piano roll is a fixed-width grid with one row per pitch (highest at the
// top) and one column per half beat. Each note fills its span with a block
// glyph. Pitches outside the rendered rows are clamped onto the edge rows
// rather than dropped, so every note stays visible.

use crate::compose::Arrangement;
use crate::event::{TimedEvent, sorted_by_start};
use crate::theory::Note;
use std::fmt::Write;
use std::ops::RangeInclusive;

/// Pitches fed to the roll are first folded into this range.
pub const ROLL_INPUT_RANGE: RangeInclusive<i32> = 48..=84;

/// Rows actually drawn.
pub const ROLL_ROWS: RangeInclusive<i32> = 60..=84;

/// Maximum lines in `event_dump`.
pub const DUMP_LIMIT: usize = 200;

const FILLED: char = '█';

/// Melody, chord pads and arpeggio, folded into `ROLL_INPUT_RANGE`.
pub fn roll_input(arrangement: &Arrangement) -> Vec<TimedEvent> {
    let (lo, hi) = (*ROLL_INPUT_RANGE.start(), *ROLL_INPUT_RANGE.end());
    arrangement
        .melody
        .iter()
        .chain(&arrangement.pads)
        .chain(&arrangement.arpeggio)
        .map(|n| TimedEvent::new(n.pitch.clamp(lo, hi), n.start, n.duration))
        .collect()
}

/// Draw `notes` over `rows`, two columns per quarter note.
pub fn piano_roll(notes: &[TimedEvent], rows: RangeInclusive<i32>) -> String {
    let (low, high) = (*rows.start(), *rows.end());
    if high < low {
        return String::new();
    }
    let total_quarters = notes.iter().map(TimedEvent::end).fold(0.0, f64::max).ceil();
    let cols = ((total_quarters * 2.0) as usize).max(1);
    let height = (high - low + 1) as usize;
    let mut grid = vec![vec![' '; cols]; height];

    for n in notes {
        let row = (high - n.pitch.clamp(low, high)) as usize;
        let start = (n.start * 2.0).round() as i64;
        let length = ((n.duration * 2.0).round() as i64).max(1);
        for col in start..start + length {
            if (0..cols as i64).contains(&col) {
                grid[row][col as usize] = FILLED;
            }
        }
    }

    let mut out = format!("ASCII Piano Roll (top = {high})\n");
    for (r, cells) in grid.iter().enumerate() {
        let name = Note::new(high - r as i32).name();
        let line: String = cells.iter().collect();
        let _ = writeln!(out, "{name:<4} |{line}|");
    }
    out
}

/// "Key: ..., Tempo: ..." header followed by one line per bar.
pub fn progression_listing(arrangement: &Arrangement, tempo_bpm: u32, style: &str) -> String {
    let mut out = format!(
        "Key: {}, Tempo: {}, Style: {}, Bars: {}\nProgression:\n",
        arrangement.key.name(),
        tempo_bpm,
        style,
        arrangement.progression.len()
    );
    for (i, chord) in arrangement.progression.iter().enumerate() {
        let _ = writeln!(out, "Bar {}: {}", i + 1, chord.name());
    }
    out
}

fn note_line(label: &str, n: &TimedEvent) -> String {
    format!(
        "{label} | {:5.2} -> {:5.2} : {} ({})",
        n.start,
        n.end(),
        n.note(),
        n.pitch
    )
}

/// Melody notes in start order, one per line.
pub fn melody_dump(melody: &[TimedEvent]) -> String {
    let mut out = String::new();
    for n in sorted_by_start(melody) {
        let _ = writeln!(
            out,
            "{:5.2} - {:5.2} : {} ({})",
            n.start,
            n.end(),
            n.note(),
            n.pitch
        );
    }
    out
}

/// Every part in turn (melody, bass, chords, drums), stopping after
/// `limit` lines.
pub fn event_dump(arrangement: &Arrangement, limit: usize) -> String {
    let chords = arrangement.chord_track();
    let pitched = [
        ("Mel", arrangement.melody.as_slice()),
        ("Bass", arrangement.bass.as_slice()),
        ("Chord", chords.as_slice()),
    ];
    let lines = pitched
        .iter()
        .flat_map(|(label, notes)| notes.iter().map(move |n| note_line(label, n)))
        .chain(
            arrangement
                .drums
                .iter()
                .map(|d| format!("Drum | {:5.2} : MIDI {}", d.start, d.pitch)),
        )
        .take(limit);

    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
