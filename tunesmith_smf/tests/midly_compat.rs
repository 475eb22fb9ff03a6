// Cross-check: files produced by this crate parse cleanly with `midly`, and
// the delta times midly reads back agree with our own decoder.

use midly::num::u15;
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use tunesmith_smf::{EventKind, Format, TrackBuilder, decode_track, encode_file, parse_file};

fn sample_file() -> Vec<u8> {
    let mut tempo = TrackBuilder::new();
    tempo.push(0, EventKind::Tempo(600_000));
    tempo.push(
        0,
        EventKind::TimeSignature {
            numerator: 4,
            denominator_pow2: 2,
            clocks_per_click: 24,
            thirty_seconds_per_quarter: 8,
        },
    );

    let mut bass = TrackBuilder::new();
    bass.push(0, EventKind::ProgramChange { channel: 1, program: 32 });
    for beat in 0..8u32 {
        let tick = beat * 480;
        bass.push(tick, EventKind::NoteOn { channel: 1, key: 48, velocity: 96 });
        bass.push(tick + 480, EventKind::NoteOff { channel: 1, key: 48, velocity: 0 });
    }

    encode_file(Format::Parallel, 480, &[tempo, bass]).unwrap()
}

#[test]
fn midly_parses_our_output() {
    let bytes = sample_file();
    let smf = Smf::parse(&bytes).unwrap();
    assert_eq!(smf.header.format, midly::Format::Parallel);
    assert_eq!(smf.header.timing, Timing::Metrical(u15::new(480)));
    assert_eq!(smf.tracks.len(), 2);

    let tempo_track = &smf.tracks[0];
    assert!(matches!(
        tempo_track[0].kind,
        TrackEventKind::Meta(MetaMessage::Tempo(t)) if t.as_int() == 600_000
    ));
    assert!(matches!(
        tempo_track.last().map(|e| e.kind),
        Some(TrackEventKind::Meta(MetaMessage::EndOfTrack))
    ));

    let ons = smf.tracks[1]
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. }
            )
        })
        .count();
    let offs = smf.tracks[1]
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                TrackEventKind::Midi { message: MidiMessage::NoteOff { .. }, .. }
            )
        })
        .count();
    assert_eq!(ons, 8);
    assert_eq!(offs, 8);
}

#[test]
fn delta_times_agree_with_midly() {
    let bytes = sample_file();
    let smf = Smf::parse(&bytes).unwrap();
    let (_, bodies) = parse_file(&bytes).unwrap();

    for (ours, theirs) in bodies.iter().zip(&smf.tracks) {
        let decoded = decode_track(ours).unwrap();
        assert_eq!(decoded.len(), theirs.len());
        let mut abs = 0u32;
        for (a, b) in decoded.iter().zip(theirs) {
            abs += b.delta.as_int();
            assert_eq!(a.tick, abs);
        }
    }
}

#[test]
fn back_to_back_notes_do_not_overlap() {
    // Note-off at 480 must precede the note-on at 480 for the same key,
    // otherwise a player would cut the new note immediately.
    let bytes = sample_file();
    let smf = Smf::parse(&bytes).unwrap();
    let mut abs = 0u32;
    let mut sounding = false;
    for event in &smf.tracks[1] {
        abs += event.delta.as_int();
        if let TrackEventKind::Midi { message, .. } = event.kind {
            match message {
                MidiMessage::NoteOn { .. } => {
                    assert!(!sounding, "overlapping note-on at tick {abs}");
                    sounding = true;
                }
                MidiMessage::NoteOff { .. } => sounding = false,
                _ => {}
            }
        }
    }
    assert!(!sounding);
}
