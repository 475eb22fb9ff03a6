// Scale and key definitions.
//
// Pitches are plain `i32` semitone numbers on the MIDI keyboard scale
// (60 = middle C = "C4"). They stay signed while the generators do
// arithmetic on them; only the MIDI writer narrows them to 0..=127.
//
// A `Key` is a root pitch plus a `ScaleType`. Scale degrees are zero-based
// and may be negative or exceed the scale length: the degree wraps into the
// interval table and the overflow becomes whole octaves, so degree 7 of a
// major key is the root an octave up and degree -1 is the leading tone
// below the root.
//
// Used by harmony.rs (chord roots), melody.rs and markov.rs (scale tones).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pitch class names, sharps only (indexed by pitch class 0-11).
pub const PITCH_CLASS_NAMES: [&str; 12] =
    ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Name of a pitch class, e.g. `pitch_class_name(61) == "C#"`.
pub fn pitch_class_name(pitch: i32) -> &'static str {
    PITCH_CLASS_NAMES[pitch.rem_euclid(12) as usize]
}

/// A single pitch with a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Note {
    pub pitch: i32,
}

impl Note {
    pub fn new(pitch: i32) -> Self {
        Note { pitch }
    }

    /// Octave number in scientific pitch notation (60 → 4).
    pub fn octave(self) -> i32 {
        self.pitch.div_euclid(12) - 1
    }

    /// Display name, e.g. "C4", "F#3".
    pub fn name(self) -> String {
        format!("{}{}", pitch_class_name(self.pitch), self.octave())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Scale families the generator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleType {
    Major,
    #[serde(alias = "minor_natural")]
    MinorNatural,
    #[serde(alias = "minor_harmonic")]
    MinorHarmonic,
    #[serde(alias = "major_pentatonic")]
    MajorPentatonic,
    #[serde(alias = "minor_pentatonic")]
    MinorPentatonic,
}

impl ScaleType {
    pub const ALL: [ScaleType; 5] = [
        ScaleType::Major,
        ScaleType::MinorNatural,
        ScaleType::MinorHarmonic,
        ScaleType::MajorPentatonic,
        ScaleType::MinorPentatonic,
    ];

    /// Semitone offsets from the root, ascending, starting at 0.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::MinorNatural => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::MinorHarmonic => &[0, 2, 3, 5, 7, 8, 11],
            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],
        }
    }

    pub fn len(self) -> usize {
        self.intervals().len()
    }

    /// The identifier used in prompts and config files.
    pub fn id(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::MinorNatural => "minorNatural",
            ScaleType::MinorHarmonic => "minorHarmonic",
            ScaleType::MajorPentatonic => "majorPentatonic",
            ScaleType::MinorPentatonic => "minorPentatonic",
        }
    }
}

impl FromStr for ScaleType {
    type Err = String;

    /// Accepts the camelCase identifiers case-insensitively, plus
    /// snake_case / kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match folded.as_str() {
            "major" | "ionian" => Ok(ScaleType::Major),
            "minor" | "minornatural" | "naturalminor" | "aeolian" => Ok(ScaleType::MinorNatural),
            "minorharmonic" | "harmonicminor" => Ok(ScaleType::MinorHarmonic),
            "majorpentatonic" | "pentatonicmajor" => Ok(ScaleType::MajorPentatonic),
            "minorpentatonic" | "pentatonicminor" => Ok(ScaleType::MinorPentatonic),
            _ => Err(format!("unknown scale '{s}'")),
        }
    }
}

/// A tonal center: root pitch plus scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub root: i32,
    pub scale: ScaleType,
}

impl Key {
    pub fn new(root: i32, scale: ScaleType) -> Self {
        Key { root, scale }
    }

    /// Pitch of scale degree `degree`, shifted by `octave_shift` octaves.
    ///
    /// `degree.rem_euclid(len)` picks the interval and
    /// `degree.div_euclid(len) + octave_shift` counts added octaves, so the
    /// result is defined for every integer degree.
    pub fn note_at(&self, degree: i32, octave_shift: i32) -> Note {
        let intervals = self.scale.intervals();
        let len = intervals.len() as i32;
        let interval = intervals[degree.rem_euclid(len) as usize];
        let octaves = degree.div_euclid(len) + octave_shift;
        Note::new(self.root + interval + 12 * octaves)
    }

    /// Display name, e.g. "C major", "A# minorNatural".
    pub fn name(&self) -> String {
        format!("{} {}", pitch_class_name(self.root), self.scale.id())
    }
}
