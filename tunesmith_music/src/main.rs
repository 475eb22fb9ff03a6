// Tunesmith: CLI entry point.
//
// Asks for (or reads) a configuration, composes a piece, prints the
// diagnostics and writes a Standard MIDI File. If the file cannot be
// written the same bytes are printed to stdout as base64.
//
// Usage:
//   cargo run -p tunesmith_music --bin generate -- [--config FILE.json] [--no-prompt]
//     [--seed N] [--out FILE.mid] [--tempo BPM] [--bars N]
//
// Logging goes to stderr; set RUST_LOG (e.g. `tunesmith_music=debug`) for
// per-stage detail.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tunesmith_music::compose::compose;
use tunesmith_music::config::{GeneratorConfig, MelodyKind, prompt_config};
use tunesmith_music::midi::{MidiWriter, Saved, save_with_fallback, verify};
use tunesmith_music::render::{
    DUMP_LIMIT, ROLL_ROWS, event_dump, melody_dump, piano_roll, progression_listing, roll_input,
};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tunesmith_music=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    println!("=== Tunesmith Music Generator ===");

    println!("[1/5] Configuring...");
    let mut config = match parse_flag::<PathBuf>(&args, "--config") {
        Some(path) => load_config(&path),
        None => GeneratorConfig::default(),
    };
    if !has_flag(&args, "--no-prompt") {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        match prompt_config(config.clone(), &mut input, &mut output) {
            Ok(answered) => config = answered,
            Err(e) => eprintln!("  Prompt failed: {}. Keeping current settings.", e),
        }
    }
    if let Some(seed) = parse_flag(&args, "--seed") {
        config.seed = Some(seed);
    }
    if let Some(out) = parse_flag(&args, "--out") {
        config.output = out;
    }
    if let Some(tempo) = parse_flag(&args, "--tempo") {
        config.tempo_bpm = tempo;
    }
    if let Some(bars) = parse_flag(&args, "--bars") {
        config.bars = bars;
    }
    config.sanitize();

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    println!("  Seed: {} (rerun with --seed {} to reproduce)", seed, seed);
    let melody_name = match config.melody {
        MelodyKind::Rule => "rule-based",
        MelodyKind::Markov => "markov",
    };
    println!("  Melody: {}", melody_name);

    println!("[2/5] Composing {} bars...", config.bars);
    let arrangement = compose(&config, &mut rng);
    let quarters = arrangement.length_quarters();
    println!(
        "  Length: {:.1} bars ({:.0}s)",
        quarters / 4.0,
        quarters * 60.0 / config.tempo_bpm as f64
    );
    println!();
    print!("{}", progression_listing(&arrangement, config.tempo_bpm, &config.style));

    println!("[3/5] Diagnostics...");
    println!();
    println!("--- Melody Notes ---");
    print!("{}", melody_dump(&arrangement.melody));
    println!();
    println!("Piano roll (melody + chords + arp):");
    print!("{}", piano_roll(&roll_input(&arrangement), ROLL_ROWS));

    println!("[4/5] Encoding MIDI at {} BPM...", config.tempo_bpm);
    let writer = MidiWriter::new(config.tempo_bpm, config.humanize);
    let bytes = match writer.render(&arrangement, &mut rng) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("  Error encoding MIDI: {}", e);
            std::process::exit(1);
        }
    };
    match verify(&bytes) {
        Ok(summary) => println!(
            "  {} bytes, {} tracks, {} notes, {:.1} bars",
            bytes.len(),
            summary.tracks,
            summary.note_ons,
            summary.last_tick as f64 / (4.0 * tunesmith_music::midi::TICKS_PER_QUARTER as f64)
        ),
        Err(e) => println!("  Warning: read-back check failed: {}", e),
    }

    println!("[5/5] Writing MIDI to {}...", config.output.display());
    let stdout = io::stdout();
    match save_with_fallback(&config.output, &bytes, &mut stdout.lock()) {
        Ok(Saved::File(path)) => println!("  Wrote {}", path.display()),
        Ok(Saved::Base64 { .. }) => println!("  Decode the base64 above to get the .mid file."),
        Err(e) => {
            eprintln!("  Error printing fallback output: {}", e);
            std::process::exit(1);
        }
    }

    println!();
    println!("--- Textual dump (first {} events) ---", DUMP_LIMIT);
    print!("{}", event_dump(&arrangement, DUMP_LIMIT));

    println!();
    println!("Play with: timidity {} (or any MIDI player)", config.output.display());
}

fn load_config(path: &Path) -> GeneratorConfig {
    println!("  Loading {}...", path.display());
    match GeneratorConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            println!("  Failed to load: {}. Using defaults.", e);
            GeneratorConfig::default()
        }
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
