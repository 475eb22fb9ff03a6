// Rule-based melody generator.
//
// For each bar: draw a rhythm shape, then for each slot pick a candidate
// pitch (70% a chord tone, 30% any scale tone, each with a random register
// offset of up to an octave). The candidate is then blended with the
// contour rule: with probability `complexity` the note instead steps at
// most two semitones from the previous note; otherwise the candidate is
// shifted by up to a fifth. Pitches are clamped to `PLAYABLE_RANGE` after
// the fact, so wide jumps can pile up at the range edges.

use crate::event::{TimedEvent, bar_start};
use crate::harmony::Chord;
use crate::rhythm::{random_bar, slots};
use crate::theory::Key;
use rand::Rng;
use std::ops::RangeInclusive;
use tracing::debug;

/// Pitch range every melody note is clamped into (C2..=C6).
pub const PLAYABLE_RANGE: RangeInclusive<i32> = 36..=84;

/// Probability that a slot starts from a chord tone rather than a scale tone.
const CHORD_TONE_WEIGHT: f64 = 0.7;

pub fn clamp_playable(pitch: i32) -> i32 {
    pitch.clamp(*PLAYABLE_RANGE.start(), *PLAYABLE_RANGE.end())
}

#[derive(Debug, Clone, Copy)]
pub struct MelodyGenerator {
    pub key: Key,
    /// Probability (0..=1) of a smooth step instead of a wider move.
    pub complexity: f64,
}

impl MelodyGenerator {
    pub fn new(key: Key, complexity: f64) -> Self {
        MelodyGenerator {
            key,
            complexity: complexity.clamp(0.0, 1.0),
        }
    }

    /// One melody line over `progression`, one bar per chord.
    pub fn generate(&self, progression: &[Chord], rng: &mut impl Rng) -> Vec<TimedEvent> {
        let mut notes = Vec::new();
        let mut previous = self.key.root;
        for (bar, chord) in progression.iter().enumerate() {
            let start = bar_start(bar);
            for (offset, length) in slots(random_bar(rng)) {
                let candidate = self.candidate(chord, rng);
                let pitch = if rng.random_bool(self.complexity) {
                    previous + rng.random_range(-2..=2)
                } else {
                    candidate + rng.random_range(-7..=7)
                };
                let pitch = clamp_playable(pitch);
                notes.push(TimedEvent::new(pitch, start + offset, length));
                previous = pitch;
            }
        }
        debug!(notes = notes.len(), complexity = self.complexity, "generated melody");
        notes
    }

    fn candidate(&self, chord: &Chord, rng: &mut impl Rng) -> i32 {
        let base = if rng.random_bool(CHORD_TONE_WEIGHT) {
            let tones = chord.pitches(0);
            if tones.is_empty() {
                chord.root
            } else {
                tones[rng.random_range(0..tones.len())]
            }
        } else {
            let degree = rng.random_range(0..self.key.scale.len()) as i32;
            self.key.note_at(degree, 0).pitch
        };
        base + rng.random_range(-12..=12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmony::{HarmonyEngine, ProgressionPreset};
    use crate::theory::ScaleType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup(bars: usize) -> (Key, Vec<Chord>) {
        let key = Key::new(60, ScaleType::Major);
        let mut rng = StdRng::seed_from_u64(11);
        let prog = HarmonyEngine::new(key).progression(ProgressionPreset::Pop, bars, &mut rng);
        (key, prog)
    }

    #[test]
    fn fills_every_bar_exactly() {
        let (key, prog) = setup(8);
        let melody = MelodyGenerator::new(key, 0.6).generate(&prog, &mut StdRng::seed_from_u64(5));
        for bar in 0..8 {
            let lo = bar_start(bar);
            let in_bar: f64 = melody
                .iter()
                .filter(|n| n.start >= lo && n.start < lo + 4.0)
                .map(|n| n.duration)
                .sum();
            assert_eq!(in_bar, 4.0, "bar {bar}");
        }
        let last = melody.last().unwrap();
        assert_eq!(last.end(), 32.0);
    }

    #[test]
    fn notes_are_contiguous_and_in_range() {
        let (key, prog) = setup(16);
        let melody = MelodyGenerator::new(key, 0.3).generate(&prog, &mut StdRng::seed_from_u64(8));
        for pair in melody.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start);
        }
        assert!(melody.iter().all(|n| PLAYABLE_RANGE.contains(&n.pitch)));
    }

    #[test]
    fn full_complexity_moves_by_small_steps() {
        let (key, prog) = setup(8);
        let melody = MelodyGenerator::new(key, 1.0).generate(&prog, &mut StdRng::seed_from_u64(2));
        assert!((melody[0].pitch - 60).abs() <= 2);
        for pair in melody.windows(2) {
            assert!((pair[1].pitch - pair[0].pitch).abs() <= 2);
        }
    }

    #[test]
    fn same_seed_same_melody() {
        let (key, prog) = setup(4);
        let generator = MelodyGenerator::new(key, 0.6);
        let a = generator.generate(&prog, &mut StdRng::seed_from_u64(42));
        let b = generator.generate(&prog, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn complexity_is_clamped() {
        let key = Key::new(60, ScaleType::Major);
        assert_eq!(MelodyGenerator::new(key, 3.0).complexity, 1.0);
        assert_eq!(MelodyGenerator::new(key, -1.0).complexity, 0.0);
    }

    #[test]
    fn empty_progression_gives_empty_melody() {
        let key = Key::new(60, ScaleType::Major);
        let melody = MelodyGenerator::new(key, 0.6).generate(&[], &mut StdRng::seed_from_u64(1));
        assert!(melody.is_empty());
    }
}
