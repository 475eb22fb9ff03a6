// Standard MIDI File wire format.
//
// A small, dependency-light encoder for the parts of SMF that the music
// generator needs, plus a matching reader used for verification.
//
// Architecture:
// - vlq.rs: variable-length quantity encode/decode (delta times, meta lengths)
// - event.rs: `EventKind` (note on/off, program change, tempo, time signature,
//   track name, end of track) with byte encoding and equal-tick ordering rank
// - track.rs: `TrackBuilder` sorts absolute-tick events, delta-encodes them,
//   appends end-of-track; `decode_track` inverts it
// - file.rs: `MThd`/`MTrk` chunk framing and whole-file assembly/parsing
// - error.rs: `SmfError`
//
// No music knowledge lives here: callers decide pitches, channels and ticks.

pub mod error;
pub mod event;
pub mod file;
pub mod track;
pub mod vlq;

pub use error::{Result, SmfError};
pub use event::{EventKind, TrackEvent};
pub use file::{Format, Header, build_file, encode_file, parse_file};
pub use track::{TrackBuilder, decode_track};
pub use vlq::{MAX_VLQ, encode_vlq, read_vlq, write_vlq};
