// Generator configuration: defaults, JSON file, interactive prompts.
//
// Sources are layered by the binary, later wins: `GeneratorConfig::default()`,
// then an optional JSON file (`load`), then the interactive prompts
// (`prompt_config`), then CLI flags. Nothing here is fatal. A prompt answer
// that is blank or does not parse keeps the value already in place, with a
// warning for the latter. Key root must be a MIDI pitch, tempo must lie in
// `1..=MAX_TEMPO_BPM` and bar count must be at least 1 wherever they come
// from. Humanize spreads above `MAX_TIMING_MS` or 127 velocity steps are
// capped.
//
// Style is kept as free text so unknown names survive into the diagnostics;
// `Style::from_name` maps it onto a progression preset and melody
// complexity, falling back to the pop preset.

use crate::error::Result;
use crate::harmony::ProgressionPreset;
use crate::midi::{Humanize, MAX_TEMPO_BPM, MAX_TIMING_MS};
use crate::theory::{Key, ScaleType};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// Musical style named by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Classical,
    Jazz,
    Minimal,
    Ambient,
    Edm,
    Other,
}

impl Style {
    pub fn from_name(name: &str) -> Style {
        match name.trim().to_lowercase().as_str() {
            "classical" => Style::Classical,
            "jazz" => Style::Jazz,
            "minimal" => Style::Minimal,
            "ambient" => Style::Ambient,
            "edm" => Style::Edm,
            _ => Style::Other,
        }
    }

    pub fn preset(self) -> ProgressionPreset {
        match self {
            Style::Classical => ProgressionPreset::Classic,
            Style::Jazz => ProgressionPreset::Jazz,
            Style::Minimal | Style::Ambient => ProgressionPreset::Random,
            Style::Edm | Style::Other => ProgressionPreset::Pop,
        }
    }

    /// Smooth-step probability for the rule-based melody.
    pub fn complexity(self) -> f64 {
        match self {
            Style::Jazz => 0.9,
            _ => 0.6,
        }
    }
}

/// Which melody generator to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MelodyKind {
    #[default]
    Rule,
    Markov,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub style: String,
    /// Key root as a MIDI pitch (60 = C4).
    pub key_root: i32,
    pub scale: ScaleType,
    pub tempo_bpm: u32,
    pub bars: usize,
    pub melody: MelodyKind,
    /// Fixed RNG seed; drawn from the OS when absent.
    pub seed: Option<u64>,
    pub humanize: Humanize,
    pub output: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            style: "classical".to_string(),
            key_root: 60,
            scale: ScaleType::Major,
            tempo_bpm: 100,
            bars: 8,
            melody: MelodyKind::Rule,
            seed: None,
            humanize: Humanize::default(),
            output: PathBuf::from("composition.mid"),
        }
    }
}

impl GeneratorConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: GeneratorConfig = serde_json::from_str(text)?;
        config.sanitize();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Restore defaults for values the generator cannot use.
    pub fn sanitize(&mut self) {
        let defaults = GeneratorConfig::default();
        if !(0..=127).contains(&self.key_root) {
            warn!(
                key_root = self.key_root,
                default = defaults.key_root,
                "key root is not a MIDI pitch"
            );
            self.key_root = defaults.key_root;
        }
        if !(1..=MAX_TEMPO_BPM).contains(&self.tempo_bpm) {
            warn!(
                tempo_bpm = self.tempo_bpm,
                default = defaults.tempo_bpm,
                "tempo must be between 1 and {MAX_TEMPO_BPM} BPM"
            );
            self.tempo_bpm = defaults.tempo_bpm;
        }
        if self.bars == 0 {
            warn!(default = defaults.bars, "bar count must be at least 1");
            self.bars = defaults.bars;
        }
        if self.humanize.timing_ms > MAX_TIMING_MS {
            warn!(timing_ms = self.humanize.timing_ms, cap = MAX_TIMING_MS, "timing spread capped");
            self.humanize.timing_ms = MAX_TIMING_MS;
        }
        if self.humanize.velocity > 127 {
            warn!(velocity = self.humanize.velocity, cap = 127, "velocity spread capped");
            self.humanize.velocity = 127;
        }
    }

    pub fn style(&self) -> Style {
        Style::from_name(&self.style)
    }

    pub fn key(&self) -> Key {
        Key::new(self.key_root, self.scale)
    }
}

/// Print `text` with its default, read one line. `None` for a blank answer
/// or end of input.
fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
    default: &str,
) -> io::Result<Option<String>> {
    write!(output, "{text} [default: {default}]: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Parse an answer, keeping `current` (with a warning) when it does not
/// parse or fails `valid`.
fn parse_or_keep<T>(
    answer: Option<String>,
    current: T,
    field: &str,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + std::fmt::Debug,
{
    let Some(answer) = answer else {
        return current;
    };
    match answer.parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            warn!(field, input = %answer, default = ?current, "invalid answer, keeping default");
            current
        }
    }
}

/// Ask for style, key root, scale, tempo, bars and melody generator, using
/// `config` for the defaults shown.
pub fn prompt_config<R: BufRead, W: Write>(
    mut config: GeneratorConfig,
    input: &mut R,
    output: &mut W,
) -> io::Result<GeneratorConfig> {
    let style = ask(
        input,
        output,
        "Choose style (classical/jazz/minimal/ambient/edm)",
        &config.style,
    )?;
    if let Some(style) = style {
        config.style = style.to_lowercase();
    }

    let root = ask(input, output, "Key root (C4=60)", &config.key_root.to_string())?;
    config.key_root = parse_or_keep(root, config.key_root, "key_root", |p| (0..=127).contains(p));

    let scale = ask(
        input,
        output,
        "Scale (major/minorNatural/minorHarmonic/majorPentatonic/minorPentatonic)",
        config.scale.id(),
    )?;
    config.scale = parse_or_keep(scale, config.scale, "scale", |_| true);

    let tempo = ask(input, output, "Tempo (BPM)", &config.tempo_bpm.to_string())?;
    config.tempo_bpm = parse_or_keep(tempo, config.tempo_bpm, "tempo_bpm", |t| {
        (1..=MAX_TEMPO_BPM).contains(t)
    });

    let bars = ask(input, output, "Bars (number of bars)", &config.bars.to_string())?;
    config.bars = parse_or_keep(bars, config.bars, "bars", |b| *b >= 1);

    let current = if config.melody == MelodyKind::Markov { "yes" } else { "no" };
    let markov = ask(input, output, "Use Markov melody generator? (yes/no)", current)?;
    if let Some(answer) = markov {
        match answer.to_lowercase().as_str() {
            "yes" | "y" => config.melody = MelodyKind::Markov,
            "no" | "n" => config.melody = MelodyKind::Rule,
            _ => warn!(input = %answer, "expected yes or no, keeping default"),
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Cursor;

    fn run_prompts(answers: &str) -> (GeneratorConfig, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let config = prompt_config(GeneratorConfig::default(), &mut input, &mut output).unwrap();
        (config, String::from_utf8(output).unwrap())
    }

    #[test]
    fn blank_answers_keep_defaults() {
        let (config, shown) = run_prompts("\n\n\n\n\n\n");
        assert_eq!(config, GeneratorConfig::default());
        assert!(shown.contains("Tempo (BPM) [default: 100]: "));
        assert!(shown.contains("[default: major]"));
    }

    #[test]
    fn end_of_input_keeps_defaults() {
        let (config, _) = run_prompts("");
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn answers_override_defaults() {
        let (config, _) = run_prompts("Jazz\n62\nminor_harmonic\n140\n12\ny\n");
        assert_eq!(config.style, "jazz");
        assert_eq!(config.style(), Style::Jazz);
        assert_eq!(config.key_root, 62);
        assert_eq!(config.scale, ScaleType::MinorHarmonic);
        assert_eq!(config.tempo_bpm, 140);
        assert_eq!(config.bars, 12);
        assert_eq!(config.melody, MelodyKind::Markov);
    }

    #[test]
    fn bad_answers_fall_back() {
        let (config, _) = run_prompts("polka\nhigh\nlydian\n0\n-3\nmaybe\n");
        assert_eq!(config.style, "polka");
        assert_eq!(config.style().preset(), ProgressionPreset::Pop);
        assert_eq!(config.key_root, 60);
        assert_eq!(config.scale, ScaleType::Major);
        assert_eq!(config.tempo_bpm, 100);
        assert_eq!(config.bars, 8);
        assert_eq!(config.melody, MelodyKind::Rule);
    }

    #[test]
    fn style_mapping() {
        assert_eq!(Style::from_name("classical").preset(), ProgressionPreset::Classic);
        assert_eq!(Style::from_name("jazz").preset(), ProgressionPreset::Jazz);
        assert_eq!(Style::from_name("minimal").preset(), ProgressionPreset::Random);
        assert_eq!(Style::from_name("ambient").preset(), ProgressionPreset::Random);
        assert_eq!(Style::from_name("EDM").preset(), ProgressionPreset::Pop);
        assert_eq!(Style::from_name("jazz").complexity(), 0.9);
        assert_eq!(Style::from_name("edm").complexity(), 0.6);
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = GeneratorConfig::from_json(
            r#"{"style": "ambient", "scale": "minorPentatonic", "seed": 7, "melody": "markov"}"#,
        )
        .unwrap();
        assert_eq!(config.style(), Style::Ambient);
        assert_eq!(config.scale, ScaleType::MinorPentatonic);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.melody, MelodyKind::Markov);
        assert_eq!(config.tempo_bpm, 100);
        assert_eq!(config.humanize, Humanize::default());
        assert_eq!(config.output, PathBuf::from("composition.mid"));
    }

    #[test]
    fn json_zero_tempo_is_replaced() {
        let config = GeneratorConfig::from_json(r#"{"tempo_bpm": 0, "bars": 0}"#).unwrap();
        assert_eq!(config.tempo_bpm, 100);
        assert_eq!(config.bars, 8);
    }

    #[test]
    fn json_out_of_range_key_root_is_replaced() {
        for root in ["2147483647", "-2147483648", "128", "-1"] {
            let text = format!(r#"{{"key_root": {root}, "bars": 2}}"#);
            let config = GeneratorConfig::from_json(&text).unwrap();
            assert_eq!(config.key_root, 60);
            let arrangement = compose(&config, &mut StdRng::seed_from_u64(1));
            assert_eq!(arrangement.progression.len(), 2);
        }
    }

    #[test]
    fn json_tempo_above_the_cap_is_replaced() {
        let config = GeneratorConfig::from_json(r#"{"tempo_bpm": 100000000}"#).unwrap();
        assert_eq!(config.tempo_bpm, 100);
        let config = GeneratorConfig::from_json(r#"{"tempo_bpm": 960}"#).unwrap();
        assert_eq!(config.tempo_bpm, 960);
    }

    #[test]
    fn prompted_tempo_above_the_cap_is_rejected() {
        let (config, _) = run_prompts("\n\n\n100000000\n\n\n");
        assert_eq!(config.tempo_bpm, 100);
    }

    #[test]
    fn json_huge_humanize_is_capped() {
        let config = GeneratorConfig::from_json(
            r#"{"humanize": {"timing_ms": 4000000000, "velocity": 255}}"#,
        )
        .unwrap();
        assert_eq!(config.humanize, Humanize { timing_ms: MAX_TIMING_MS, velocity: 127 });
    }

    #[test]
    fn json_partial_humanize() {
        let config = GeneratorConfig::from_json(r#"{"humanize": {"timing_ms": 0}}"#).unwrap();
        assert_eq!(config.humanize, Humanize { timing_ms: 0, velocity: 8 });
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(GeneratorConfig::from_json("{ not json").is_err());
        assert!(GeneratorConfig::from_json(r#"{"scale": "lydian"}"#).is_err());
    }
}
