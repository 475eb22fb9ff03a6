// MIDI output from generated parts.
//
// Converts timed events into a Standard MIDI File (format 1) for playback:
// track 0 carries only tempo and time signature, then one track each for
// melody, bass, chords (pads + arpeggio) and drums. Encoding goes through
// `tunesmith_smf`, which sorts events (note-off before note-on at equal
// ticks) and delta-encodes them.
//
// Humanization happens here, per note: the nominal start tick
// (`quarters * TICKS_PER_QUARTER`) is shifted by a random number of
// milliseconds converted to ticks at the current tempo, and the velocity is
// nudged and clamped to `[floor, 127]`. Start ticks are clamped at 0 and
// every note lasts at least one tick, so an off event never precedes its on.
// Tempo is held to `1..=MAX_TEMPO_BPM` and the timing spread to
// `MAX_TIMING_MS`, which keeps every tick inside the 28-bit delta range.
//
// After encoding, `verify` parses the bytes back with `midly` as a sanity
// check. `save_with_fallback` writes the file and, if the filesystem refuses,
// prints the same bytes as base64 instead of failing.

use crate::compose::Arrangement;
use crate::error::Result;
use crate::event::TimedEvent;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use midly::{MidiMessage, Smf, TrackEventKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tunesmith_smf::{EventKind, Format, TrackBuilder, encode_file};

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Largest tempo value the 24-bit tempo meta event can hold.
const MAX_MICROS_PER_QUARTER: u32 = 0xFF_FFFF;

/// Fastest tempo the writer will encode.
pub const MAX_TEMPO_BPM: u32 = 960;

/// Widest timing spread humanization applies, in milliseconds.
pub const MAX_TIMING_MS: u32 = 1000;

/// Random timing and velocity spread applied to every note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Humanize {
    /// Maximum start-time shift either way, in milliseconds.
    pub timing_ms: u32,
    /// Maximum velocity change either way.
    pub velocity: u8,
}

impl Default for Humanize {
    fn default() -> Self {
        Humanize { timing_ms: 12, velocity: 8 }
    }
}

impl Humanize {
    /// Exact grid timing and fixed velocities.
    pub fn none() -> Self {
        Humanize { timing_ms: 0, velocity: 0 }
    }
}

/// Per-track channel and dynamics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartStyle {
    pub name: &'static str,
    pub channel: u8,
    pub program: Option<u8>,
    pub base_velocity: u8,
    /// Lowest velocity humanization may produce; always at least 1 so a
    /// note-on is never read as a note-off.
    pub velocity_floor: u8,
}

pub const MELODY: PartStyle = PartStyle {
    name: "Melody",
    channel: 0,
    program: None,
    base_velocity: 90,
    velocity_floor: 10,
};

pub const BASS: PartStyle = PartStyle {
    name: "Bass",
    channel: 1,
    program: Some(32),
    base_velocity: 96,
    velocity_floor: 10,
};

pub const CHORDS: PartStyle = PartStyle {
    name: "Chords",
    channel: 2,
    program: Some(0),
    base_velocity: 80,
    velocity_floor: 10,
};

pub const DRUMS: PartStyle = PartStyle {
    name: "Drums",
    channel: 9,
    program: None,
    base_velocity: 100,
    velocity_floor: 1,
};

/// Converts parts to SMF bytes at a fixed tempo.
#[derive(Debug, Clone, Copy)]
pub struct MidiWriter {
    pub tempo_bpm: u32,
    pub humanize: Humanize,
}

impl MidiWriter {
    pub fn new(tempo_bpm: u32, humanize: Humanize) -> Self {
        MidiWriter {
            tempo_bpm: tempo_bpm.clamp(1, MAX_TEMPO_BPM),
            humanize,
        }
    }

    fn ms_per_quarter(&self) -> f64 {
        60_000.0 / self.tempo_bpm as f64
    }

    /// Tempo meta value: microseconds per quarter note.
    pub fn micros_per_quarter(&self) -> u32 {
        (60_000_000 / self.tempo_bpm.max(1)).clamp(1, MAX_MICROS_PER_QUARTER)
    }

    /// Grid position of `quarters` in ticks.
    pub fn nominal_tick(quarters: f64) -> i64 {
        (quarters * TICKS_PER_QUARTER as f64).round() as i64
    }

    /// Random timing offset in ticks.
    fn jitter_ticks(&self, rng: &mut impl Rng) -> i64 {
        if self.humanize.timing_ms == 0 {
            return 0;
        }
        let bound = self.humanize.timing_ms.min(MAX_TIMING_MS) as i64;
        let ms = rng.random_range(-bound..=bound);
        let quarters = ms as f64 / self.ms_per_quarter();
        (quarters * TICKS_PER_QUARTER as f64).round() as i64
    }

    fn velocity(&self, part: &PartStyle, rng: &mut impl Rng) -> u8 {
        let floor = part.velocity_floor.max(1) as i32;
        let spread = self.humanize.velocity as i32;
        let delta = if spread == 0 {
            0
        } else {
            rng.random_range(-spread..=spread)
        };
        (part.base_velocity as i32 + delta).clamp(floor, 127) as u8
    }

    /// Build one part's track: optional name/program, then an on/off pair
    /// per event.
    pub fn part_track(
        &self,
        events: &[TimedEvent],
        part: &PartStyle,
        rng: &mut impl Rng,
    ) -> TrackBuilder {
        let mut track = TrackBuilder::new();
        track.push(0, EventKind::TrackName(part.name.to_string()));
        if let Some(program) = part.program {
            track.push(0, EventKind::ProgramChange { channel: part.channel, program });
        }
        for event in events {
            let start = (Self::nominal_tick(event.start) + self.jitter_ticks(rng)).max(0);
            let length = Self::nominal_tick(event.duration).max(1);
            let velocity = self.velocity(part, rng);
            let key = event.pitch.clamp(0, 127) as u8;
            let on = start.min(u32::MAX as i64) as u32;
            let off = (start + length).min(u32::MAX as i64) as u32;
            track.push(on, EventKind::NoteOn { channel: part.channel, key, velocity });
            track.push(off, EventKind::NoteOff { channel: part.channel, key, velocity: 0 });
        }
        track
    }

    /// Track 0: tempo and 4/4 time signature, no notes.
    pub fn tempo_track(&self) -> TrackBuilder {
        let mut track = TrackBuilder::new();
        track.push(0, EventKind::Tempo(self.micros_per_quarter()));
        track.push(
            0,
            EventKind::TimeSignature {
                numerator: 4,
                denominator_pow2: 2,
                clocks_per_click: 24,
                thirty_seconds_per_quarter: 8,
            },
        );
        track
    }

    /// All five tracks for an arrangement.
    pub fn tracks(&self, arrangement: &Arrangement, rng: &mut impl Rng) -> Vec<TrackBuilder> {
        vec![
            self.tempo_track(),
            self.part_track(&arrangement.melody, &MELODY, rng),
            self.part_track(&arrangement.bass, &BASS, rng),
            self.part_track(&arrangement.chord_track(), &CHORDS, rng),
            self.part_track(&arrangement.drums, &DRUMS, rng),
        ]
    }

    /// Encode an arrangement to SMF bytes.
    pub fn render(&self, arrangement: &Arrangement, rng: &mut impl Rng) -> Result<Vec<u8>> {
        let tracks = self.tracks(arrangement, rng);
        Ok(encode_file(Format::Parallel, TICKS_PER_QUARTER, &tracks)?)
    }
}

/// What `verify` found in an encoded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiSummary {
    pub tracks: usize,
    pub note_ons: usize,
    pub note_offs: usize,
    /// Absolute tick of the latest event in any track.
    pub last_tick: u32,
}

/// Parse encoded bytes back with `midly` and count what is there.
pub fn verify(bytes: &[u8]) -> Result<MidiSummary> {
    let smf = Smf::parse(bytes)?;
    let mut summary = MidiSummary {
        tracks: smf.tracks.len(),
        note_ons: 0,
        note_offs: 0,
        last_tick: 0,
    };
    for track in &smf.tracks {
        let mut tick = 0u32;
        for event in track {
            tick += event.delta.as_int();
            if let TrackEventKind::Midi { message, .. } = event.kind {
                match message {
                    MidiMessage::NoteOn { .. } => summary.note_ons += 1,
                    MidiMessage::NoteOff { .. } => summary.note_offs += 1,
                    _ => {}
                }
            }
        }
        summary.last_tick = summary.last_tick.max(tick);
    }
    Ok(summary)
}

/// Write `bytes` to `path`, flushing before the handle is dropped.
pub fn write_midi(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

/// Where the MIDI data ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    File(PathBuf),
    /// The file could not be written; the base64 text went to the fallback
    /// writer instead.
    Base64 { reason: String },
}

/// Write the file, or on failure dump it as base64 to `fallback`.
///
/// Only an error writing to `fallback` itself is returned.
pub fn save_with_fallback(
    path: &Path,
    bytes: &[u8],
    fallback: &mut impl Write,
) -> io::Result<Saved> {
    match write_midi(path, bytes) {
        Ok(()) => {
            info!(path = %path.display(), bytes = bytes.len(), "wrote MIDI file");
            Ok(Saved::File(path.to_path_buf()))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot write MIDI file, dumping base64");
            writeln!(
                fallback,
                "Failed to write {} ({e}). Base64 MIDI follows:",
                path.display()
            )?;
            writeln!(fallback, "{}", BASE64.encode(bytes))?;
            fallback.flush()?;
            Ok(Saved::Base64 { reason: e.to_string() })
        }
    }
}
