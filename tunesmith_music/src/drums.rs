// Drum pattern: a fixed rock backbeat with an occasional open hi-hat.
//
// Per 4/4 bar: kick on beats 1 and 3, snare on 2 and 4 (half-beat hits),
// closed hi-hat on every eighth (quarter-beat hits), and a coin flip for an
// open hi-hat accent on the "and" of 2. Hits use General MIDI percussion
// keys from `event::drum` and are meant for channel 10.

use crate::event::{TimedEvent, bar_start, drum};
use rand::Rng;
use tracing::debug;

/// Probability of the open hi-hat accent in a bar.
const ACCENT_CHANCE: f64 = 0.5;

pub fn drum_pattern(bars: usize, rng: &mut impl Rng) -> Vec<TimedEvent> {
    let mut out = Vec::with_capacity(bars * 13);
    for bar in 0..bars {
        let start = bar_start(bar);
        out.push(TimedEvent::new(drum::KICK, start, 0.5));
        out.push(TimedEvent::new(drum::KICK, start + 2.0, 0.5));
        out.push(TimedEvent::new(drum::SNARE, start + 1.0, 0.5));
        out.push(TimedEvent::new(drum::SNARE, start + 3.0, 0.5));
        for eighth in 0..8 {
            out.push(TimedEvent::new(drum::CLOSED_HAT, start + eighth as f64 * 0.5, 0.25));
        }
        if rng.random_bool(ACCENT_CHANCE) {
            out.push(TimedEvent::new(drum::OPEN_HAT, start + 1.5, 0.5));
        }
    }
    debug!(bars, hits = out.len(), "generated drums");
    out
}
