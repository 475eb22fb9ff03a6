// Tunesmith music generator
//
// Builds a short multi-part piece from a key, a style and a bar count, and
// writes it as a Standard MIDI File. A chord progression comes first; every
// other part is derived from it.
//
// Architecture:
// - theory.rs: notes, scales and keys (`Key::note_at` wraps degrees with octave carry)
// - harmony.rs: chord qualities, the diatonic quality table, progression presets
// - rhythm.rs: note durations and the one-bar rhythm shapes melodies draw from
// - event.rs: `TimedEvent` (pitch, start, duration in quarter notes)
// - melody.rs: rule-based melody (chord/scale tones blended with a contour rule)
// - markov.rs: scale-degree Markov melody
// - accompaniment.rs: bass line, arpeggio and sustained chord pads
// - drums.rs: backbeat drum pattern with a random open hi-hat accent
// - compose.rs: runs every stage in order and collects an `Arrangement`
// - midi.rs: humanized SMF output via `tunesmith_smf`, midly read-back, base64 fallback
// - render.rs: progression listing, melody/event dumps, ASCII piano roll
// - config.rs: `GeneratorConfig` (defaults, JSON, interactive prompts)
// - error.rs: `MusicError`
//
// Generation is deterministic given the RNG; the binary seeds it from
// `--seed` or the OS and prints the seed so a run can be repeated.

pub mod accompaniment;
pub mod compose;
pub mod config;
pub mod drums;
pub mod error;
pub mod event;
pub mod harmony;
pub mod markov;
pub mod melody;
pub mod midi;
pub mod render;
pub mod rhythm;
pub mod theory;
