// Note values and one-bar rhythm shapes.
//
// Melody generators pick one `BAR_SHAPES` entry per bar and place one note
// per slot. Every shape sums to exactly one 4/4 bar.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    /// One note of a quarter-note triplet.
    Triplet,
}

impl Duration {
    /// Length in quarter notes.
    pub fn quarters(self) -> f64 {
        match self {
            Duration::Whole => 4.0,
            Duration::Half => 2.0,
            Duration::Quarter => 1.0,
            Duration::Eighth => 0.5,
            Duration::Sixteenth => 0.25,
            Duration::Triplet => 1.0 / 3.0,
        }
    }
}

use self::Duration::{Eighth as E, Half as H, Quarter as Q};

/// One-bar rhythm shapes, drawn uniformly.
pub const BAR_SHAPES: [&[Duration]; 5] = [
    &[Q, Q, Q, Q],
    &[H, Q, Q],
    &[Q, Q, H],
    &[Q, E, E, Q, Q],
    &[E, E, Q, Q, Q],
];

/// Draw one bar shape.
pub fn random_bar(rng: &mut impl Rng) -> &'static [Duration] {
    BAR_SHAPES[rng.random_range(0..BAR_SHAPES.len())]
}

/// Slot offsets within the bar paired with their durations.
pub fn slots(shape: &[Duration]) -> Vec<(f64, f64)> {
    let mut offset = 0.0;
    shape
        .iter()
        .map(|d| {
            let slot = (offset, d.quarters());
            offset += d.quarters();
            slot
        })
        .collect()
}
