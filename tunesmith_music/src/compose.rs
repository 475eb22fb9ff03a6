// Pipeline driver: configuration in, every generated part out.
//
// Stage order is fixed so a seed reproduces the same piece: progression,
// melody (rule-based or Markov), the deterministic accompaniment, then
// drums. All randomness flows through the one `rng` the caller passes in.

use crate::accompaniment::{arpeggio, bass_line, chord_pads};
use crate::config::{GeneratorConfig, MelodyKind};
use crate::drums::drum_pattern;
use crate::event::TimedEvent;
use crate::harmony::{Chord, HarmonyEngine};
use crate::markov::MarkovMelodyGenerator;
use crate::melody::MelodyGenerator;
use crate::theory::Key;
use rand::Rng;
use tracing::debug;

/// Everything generated for one piece.
#[derive(Debug, Clone)]
pub struct Arrangement {
    pub key: Key,
    pub progression: Vec<Chord>,
    pub melody: Vec<TimedEvent>,
    pub bass: Vec<TimedEvent>,
    pub arpeggio: Vec<TimedEvent>,
    pub pads: Vec<TimedEvent>,
    pub drums: Vec<TimedEvent>,
}

impl Arrangement {
    /// Pads followed by the arpeggio: the contents of the chord track.
    pub fn chord_track(&self) -> Vec<TimedEvent> {
        self.pads.iter().chain(&self.arpeggio).copied().collect()
    }

    /// Length of the piece in quarter notes.
    pub fn length_quarters(&self) -> f64 {
        [&self.melody, &self.bass, &self.arpeggio, &self.pads, &self.drums]
            .into_iter()
            .flatten()
            .map(TimedEvent::end)
            .fold(0.0, f64::max)
    }
}

pub fn compose(config: &GeneratorConfig, rng: &mut impl Rng) -> Arrangement {
    let key = config.key();
    let style = config.style();
    let bars = config.bars.max(1);

    let progression = HarmonyEngine::new(key).progression(style.preset(), bars, rng);
    debug!(?style, bars, chords = progression.len(), "built progression");

    let melody = match config.melody {
        MelodyKind::Rule => {
            MelodyGenerator::new(key, style.complexity()).generate(&progression, rng)
        }
        MelodyKind::Markov => MarkovMelodyGenerator::new(key).generate(&progression, rng),
    };
    let bass = bass_line(&progression);
    let arpeggio = arpeggio(&progression);
    let pads = chord_pads(&progression);
    let drums = drum_pattern(bars, rng);

    Arrangement {
        key,
        progression,
        melody,
        bass,
        arpeggio,
        pads,
        drums,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::ScaleType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(style: &str, bars: usize, melody: MelodyKind) -> GeneratorConfig {
        GeneratorConfig {
            style: style.to_string(),
            bars,
            melody,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn every_part_spans_the_bar_count() {
        for melody in [MelodyKind::Rule, MelodyKind::Markov] {
            let cfg = config("classical", 6, melody);
            let arrangement = compose(&cfg, &mut StdRng::seed_from_u64(1));
            assert_eq!(arrangement.progression.len(), 6);
            assert_eq!(arrangement.bass.len(), 24);
            assert_eq!(arrangement.arpeggio.len(), 24);
            assert_eq!(arrangement.length_quarters(), 24.0);
            let drum_bars = arrangement.drums.iter().filter(|d| d.pitch == 36).count() / 2;
            assert_eq!(drum_bars, 6);
        }
    }

    #[test]
    fn blues_style_is_not_a_preset_but_bars_still_hold() {
        let cfg = config("blues", 3, MelodyKind::Rule);
        let arrangement = compose(&cfg, &mut StdRng::seed_from_u64(2));
        assert_eq!(arrangement.progression.len(), 3);
    }

    #[test]
    fn same_seed_same_arrangement() {
        let cfg = config("jazz", 4, MelodyKind::Rule);
        let a = compose(&cfg, &mut StdRng::seed_from_u64(99));
        let b = compose(&cfg, &mut StdRng::seed_from_u64(99));
        assert_eq!(a.progression, b.progression);
        assert_eq!(a.melody, b.melody);
        assert_eq!(a.drums, b.drums);
    }

    #[test]
    fn jazz_uses_seventh_chords() {
        let cfg = config("jazz", 3, MelodyKind::Rule);
        let arrangement = compose(&cfg, &mut StdRng::seed_from_u64(0));
        let names: Vec<String> = arrangement.progression.iter().map(Chord::name).collect();
        assert_eq!(names, vec!["Dm7", "G7", "Cmaj7"]);
    }

    #[test]
    fn chord_track_is_pads_then_arpeggio() {
        let cfg = GeneratorConfig {
            scale: ScaleType::MinorNatural,
            key_root: 57,
            bars: 2,
            ..GeneratorConfig::default()
        };
        let arrangement = compose(&cfg, &mut StdRng::seed_from_u64(5));
        let track = arrangement.chord_track();
        assert_eq!(track.len(), arrangement.pads.len() + arrangement.arpeggio.len());
        assert_eq!(track[0], arrangement.pads[0]);
        assert_eq!(track[arrangement.pads.len()], arrangement.arpeggio[0]);
    }
}
