// First-order Markov melody over scale degrees.
//
// The transition table is built from the scale length alone, not trained:
// from degree d the walk stays (weight 4), moves to d±1 (weight 3 each) or
// skips to d±2 (weight 1 each), dropping any neighbor that would leave
// 0..len. The walk starts on the tonic and takes one step per rhythm slot;
// each degree becomes a pitch in the key plus a random register offset of
// up to an octave, clamped to the melody's playable range.
//
// Rhythm comes from the same bar shapes as the rule-based generator in
// melody.rs.

use crate::event::{TimedEvent, bar_start};
use crate::harmony::Chord;
use crate::melody::clamp_playable;
use crate::rhythm::{random_bar, slots};
use crate::theory::Key;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

const STAY_WEIGHT: f64 = 4.0;
const STEP_WEIGHT: f64 = 3.0;
const SKIP_WEIGHT: f64 = 1.0;

/// Next-degree weights (unnormalized) keyed by degree.
type TransitionTable = BTreeMap<i32, f64>;

/// Degree-to-degree transition model for one scale length.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeChain {
    transitions: BTreeMap<i32, TransitionTable>,
}

impl DegreeChain {
    /// Build the stay/step/skip table for a scale with `degrees` notes.
    pub fn for_scale_length(degrees: usize) -> Self {
        let n = degrees as i32;
        let mut transitions = BTreeMap::new();
        for d in 0..n {
            let mut table = TransitionTable::new();
            table.insert(d, STAY_WEIGHT);
            let neighbours = [
                (1, STEP_WEIGHT),
                (-1, STEP_WEIGHT),
                (2, SKIP_WEIGHT),
                (-2, SKIP_WEIGHT),
            ];
            for (offset, weight) in neighbours {
                let next = d + offset;
                if (0..n).contains(&next) {
                    table.insert(next, weight);
                }
            }
            transitions.insert(d, table);
        }
        DegreeChain { transitions }
    }

    /// Weights out of `degree`, if it is a known state.
    pub fn table(&self, degree: i32) -> Option<&TransitionTable> {
        self.transitions.get(&degree)
    }

    /// Next degree for a uniform draw `rng_val` in [0, 1). Unknown states
    /// stay where they are.
    pub fn step(&self, from: i32, rng_val: f64) -> i32 {
        self.table(from)
            .and_then(|table| sample_from_table(table, rng_val))
            .unwrap_or(from)
    }
}

/// Sample a key from a weight table using a random value in [0, 1).
fn sample_from_table(table: &TransitionTable, rng_val: f64) -> Option<i32> {
    let total: f64 = table.values().sum();
    if table.is_empty() || total <= 0.0 {
        return None;
    }
    let target = rng_val * total;
    let mut cumulative = 0.0;
    for (&degree, &weight) in table {
        cumulative += weight;
        if cumulative > target {
            return Some(degree);
        }
    }
    table.keys().next_back().copied()
}

#[derive(Debug, Clone)]
pub struct MarkovMelodyGenerator {
    pub key: Key,
    chain: DegreeChain,
}

impl MarkovMelodyGenerator {
    pub fn new(key: Key) -> Self {
        MarkovMelodyGenerator {
            key,
            chain: DegreeChain::for_scale_length(key.scale.len()),
        }
    }

    pub fn chain(&self) -> &DegreeChain {
        &self.chain
    }

    /// One melody line over `progression`, one bar per chord. Only the bar
    /// count of the progression matters; the walk ignores chord tones.
    pub fn generate(&self, progression: &[Chord], rng: &mut impl Rng) -> Vec<TimedEvent> {
        let mut notes = Vec::new();
        let mut degree = 0;
        for bar in 0..progression.len() {
            let start = bar_start(bar);
            for (offset, length) in slots(random_bar(rng)) {
                degree = self.chain.step(degree, rng.random::<f64>());
                let register = rng.random_range(-12..=12);
                let pitch = clamp_playable(self.key.note_at(degree, 0).pitch + register);
                notes.push(TimedEvent::new(pitch, start + offset, length));
            }
        }
        debug!(notes = notes.len(), "generated markov melody");
        notes
    }
}
