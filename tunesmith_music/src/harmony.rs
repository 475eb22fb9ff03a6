// Chords, diatonic chord-quality inference, and progression presets.
//
// A `Chord` is a root pitch plus semitone intervals. `HarmonyEngine::triad`
// builds chords on scale degrees; when no explicit `ChordQuality` is given,
// the quality comes from `DIATONIC_QUALITIES`, a lookup table indexed by
// (`ScaleCategory`, degree). Only the major scale gets a full diatonic row;
// every other scale uses a simplified minor-leaning row.
//
// `progression` dispatches on `ProgressionPreset` and then normalizes the
// result to exactly `bars` chords: empty → all tonic, too long → truncated,
// too short → padded with the tonic. The blues preset deliberately ignores
// `bars` and relies on that normalization.
//
// Consumed by every part generator (melody.rs, markov.rs, accompaniment.rs).

use crate::theory::{Key, Note, ScaleType, pitch_class_name};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chord shapes the engine can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Maj7,
    Min7,
    Dom7,
}

impl ChordQuality {
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Maj7 => &[0, 4, 7, 11],
            ChordQuality::Min7 => &[0, 3, 7, 10],
            ChordQuality::Dom7 => &[0, 4, 7, 10],
        }
    }
}

/// Which row of the diatonic quality table a scale uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleCategory {
    Major,
    Other,
}

impl ScaleCategory {
    pub fn of(scale: ScaleType) -> Self {
        match scale {
            ScaleType::Major => ScaleCategory::Major,
            _ => ScaleCategory::Other,
        }
    }
}

/// Inferred triad quality per (category, degree). Degrees past the end of
/// a row reuse its last entry.
const DIATONIC_QUALITIES: [(ScaleCategory, &[ChordQuality]); 2] = [
    (
        ScaleCategory::Major,
        &[
            ChordQuality::Major,
            ChordQuality::Minor,
            ChordQuality::Minor,
            ChordQuality::Major,
            ChordQuality::Major,
            ChordQuality::Minor,
            ChordQuality::Diminished,
        ],
    ),
    (
        ScaleCategory::Other,
        &[ChordQuality::Minor, ChordQuality::Major, ChordQuality::Minor],
    ),
];

/// Look up the inferred triad quality for a (wrapped) scale degree.
pub fn diatonic_quality(category: ScaleCategory, degree: usize) -> ChordQuality {
    let row = DIATONIC_QUALITIES
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, row)| *row)
        .unwrap_or(&[ChordQuality::Major]);
    row.get(degree)
        .or_else(|| row.last())
        .copied()
        .unwrap_or(ChordQuality::Major)
}

/// A chord: root pitch plus intervals above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub root: i32,
    pub intervals: Vec<i32>,
}

impl Chord {
    pub fn new(root: i32, quality: ChordQuality) -> Self {
        Chord {
            root,
            intervals: quality.intervals().to_vec(),
        }
    }

    /// Member notes, shifted by `octave_shift` octaves.
    pub fn notes(&self, octave_shift: i32) -> Vec<Note> {
        self.intervals
            .iter()
            .map(|iv| Note::new(self.root + iv + 12 * octave_shift))
            .collect()
    }

    /// Member pitches, shifted by `octave_shift` octaves.
    pub fn pitches(&self, octave_shift: i32) -> Vec<i32> {
        self.notes(octave_shift).into_iter().map(|n| n.pitch).collect()
    }

    /// Short symbol: "C", "Cm", "Cmaj7", "Cm7", "C7", or the bare root for
    /// shapes without a symbol (e.g. diminished).
    pub fn name(&self) -> String {
        let root = pitch_class_name(self.root);
        let suffix = match self.intervals.as_slice() {
            [0, 4, 7] => "",
            [0, 3, 7] => "m",
            [0, 4, 7, 11] => "maj7",
            [0, 3, 7, 10] => "m7",
            [0, 4, 7, 10] => "7",
            _ => "",
        };
        format!("{root}{suffix}")
    }
}

/// Named chord-sequence recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionPreset {
    /// I – IV – V – I
    Classic,
    /// I – V – vi – IV
    Pop,
    /// ii7 – V7 – Imaj7
    Jazz,
    /// Twelve-bar blues, always twelve chords before normalization.
    Blues12,
    /// Independent uniformly random degree per bar.
    Random,
}

/// Builds chords and progressions within one key.
#[derive(Debug, Clone, Copy)]
pub struct HarmonyEngine {
    pub key: Key,
}

impl HarmonyEngine {
    pub fn new(key: Key) -> Self {
        HarmonyEngine { key }
    }

    /// Chord on scale degree `degree`. `None` infers the quality from the
    /// diatonic table.
    pub fn triad(&self, degree: i32, quality: Option<ChordQuality>, octave_shift: i32) -> Chord {
        let root = self.key.note_at(degree, octave_shift).pitch;
        let quality = quality.unwrap_or_else(|| {
            let wrapped = degree.rem_euclid(self.key.scale.len() as i32) as usize;
            diatonic_quality(ScaleCategory::of(self.key.scale), wrapped)
        });
        Chord::new(root, quality)
    }

    fn tonic(&self) -> Chord {
        self.triad(0, None, 0)
    }

    /// Exactly `bars` chords following `preset`.
    pub fn progression(
        &self,
        preset: ProgressionPreset,
        bars: usize,
        rng: &mut impl Rng,
    ) -> Vec<Chord> {
        let raw = match preset {
            ProgressionPreset::Classic => self.cycle(&[0, 3, 4, 0], bars),
            ProgressionPreset::Pop => self.cycle(&[0, 4, 5, 3], bars),
            ProgressionPreset::Jazz => {
                let cell = [
                    self.triad(1, Some(ChordQuality::Min7), 0),
                    self.triad(4, Some(ChordQuality::Dom7), 0),
                    self.triad(0, Some(ChordQuality::Maj7), 0),
                ];
                cell.iter().cycle().take(bars).cloned().collect()
            }
            ProgressionPreset::Blues12 => {
                let i = self.triad(0, None, 0);
                let iv = self.triad(3, None, 0);
                let v = self.triad(4, None, 0);
                vec![
                    i.clone(), i.clone(), i.clone(), i.clone(),
                    iv.clone(), iv.clone(), i.clone(), i.clone(),
                    v, iv, i.clone(), i,
                ]
            }
            ProgressionPreset::Random => {
                let degrees = self.key.scale.len().max(1);
                (0..bars)
                    .map(|_| self.triad(rng.random_range(0..degrees) as i32, None, 0))
                    .collect()
            }
        };
        debug!(?preset, bars, generated = raw.len(), "built progression");
        self.normalize(raw, bars)
    }

    /// Degree cycle advanced across all bars with inferred qualities.
    fn cycle(&self, degrees: &[i32], bars: usize) -> Vec<Chord> {
        degrees
            .iter()
            .cycle()
            .take(bars)
            .map(|&d| self.triad(d, None, 0))
            .collect()
    }

    /// Force a chord list to exactly `bars` entries.
    pub fn normalize(&self, mut chords: Vec<Chord>, bars: usize) -> Vec<Chord> {
        chords.truncate(bars);
        while chords.len() < bars {
            chords.push(self.tonic());
        }
        chords
    }
}
