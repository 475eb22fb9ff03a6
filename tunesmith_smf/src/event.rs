// Track events and their byte encoding.
//
// A `TrackEvent` pairs an absolute tick with an `EventKind`. Absolute ticks
// let callers push events in any order; `track.rs` sorts them and converts
// to delta times at encode time.
//
// Only the subset of SMF events the generator emits is modelled: note
// on/off, program change, and the tempo / time signature / track name meta
// events. Running status is never used, so every channel event is written
// with its full status byte.

use crate::error::{Result, SmfError};
use crate::vlq::{read_vlq, write_vlq};

const META: u8 = 0xFF;
const META_TRACK_NAME: u8 = 0x03;
const META_END_OF_TRACK: u8 = 0x2F;
const META_TEMPO: u8 = 0x51;
const META_TIME_SIGNATURE: u8 = 0x58;

/// One event payload, without timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ProgramChange { channel: u8, program: u8 },
    /// Microseconds per quarter note (24-bit).
    Tempo(u32),
    TimeSignature {
        numerator: u8,
        /// Denominator as a power of two (2 = quarter note).
        denominator_pow2: u8,
        clocks_per_click: u8,
        thirty_seconds_per_quarter: u8,
    },
    TrackName(String),
    EndOfTrack,
}

impl EventKind {
    /// Ordering rank among events sharing a tick. Setup events (meta,
    /// program changes) come first, then note-offs, then note-ons, so a
    /// note ending exactly where another starts never overlaps it.
    pub fn rank(&self) -> u8 {
        match self {
            EventKind::NoteOff { .. } => 1,
            EventKind::NoteOn { .. } => 2,
            EventKind::EndOfTrack => 3,
            _ => 0,
        }
    }

    /// Key number for note events, 0 for everything else.
    pub fn key(&self) -> u8 {
        match self {
            EventKind::NoteOn { key, .. } | EventKind::NoteOff { key, .. } => *key,
            _ => 0,
        }
    }

    /// Append the encoded event (no delta time) to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            EventKind::NoteOn { channel, key, velocity } => {
                out.extend_from_slice(&[0x90 | (channel & 0x0F), key & 0x7F, velocity & 0x7F]);
            }
            EventKind::NoteOff { channel, key, velocity } => {
                out.extend_from_slice(&[0x80 | (channel & 0x0F), key & 0x7F, velocity & 0x7F]);
            }
            EventKind::ProgramChange { channel, program } => {
                out.extend_from_slice(&[0xC0 | (channel & 0x0F), program & 0x7F]);
            }
            EventKind::Tempo(micros) => {
                let b = micros.to_be_bytes();
                out.extend_from_slice(&[META, META_TEMPO, 0x03, b[1], b[2], b[3]]);
            }
            EventKind::TimeSignature {
                numerator,
                denominator_pow2,
                clocks_per_click,
                thirty_seconds_per_quarter,
            } => {
                out.extend_from_slice(&[
                    META,
                    META_TIME_SIGNATURE,
                    0x04,
                    *numerator,
                    *denominator_pow2,
                    *clocks_per_click,
                    *thirty_seconds_per_quarter,
                ]);
            }
            EventKind::TrackName(name) => {
                out.extend_from_slice(&[META, META_TRACK_NAME]);
                write_vlq(out, name.len() as u32)?;
                out.extend_from_slice(name.as_bytes());
            }
            EventKind::EndOfTrack => {
                out.extend_from_slice(&[META, META_END_OF_TRACK, 0x00]);
            }
        }
        Ok(())
    }

    /// Decode one event from the front of `data`.
    ///
    /// Returns the event and the number of bytes consumed.
    pub fn read_from(data: &[u8]) -> Result<(EventKind, usize)> {
        let status = *data.first().ok_or(SmfError::UnexpectedEof)?;
        let arg = |i: usize| data.get(i).copied().ok_or(SmfError::UnexpectedEof);
        let channel = status & 0x0F;
        match status & 0xF0 {
            0x80 => Ok((
                EventKind::NoteOff { channel, key: arg(1)?, velocity: arg(2)? },
                3,
            )),
            0x90 => Ok((
                EventKind::NoteOn { channel, key: arg(1)?, velocity: arg(2)? },
                3,
            )),
            0xC0 => Ok((EventKind::ProgramChange { channel, program: arg(1)? }, 2)),
            0xF0 if status == META => {
                let meta_type = arg(1)?;
                let (len, len_bytes) = read_vlq(&data[2.min(data.len())..])?;
                let start = 2 + len_bytes;
                let end = start + len as usize;
                let body = data.get(start..end).ok_or(SmfError::UnexpectedEof)?;
                let kind = match (meta_type, body) {
                    (META_END_OF_TRACK, _) => EventKind::EndOfTrack,
                    (META_TEMPO, [a, b, c]) => {
                        EventKind::Tempo(u32::from_be_bytes([0, *a, *b, *c]))
                    }
                    (META_TIME_SIGNATURE, [n, d, c, t]) => EventKind::TimeSignature {
                        numerator: *n,
                        denominator_pow2: *d,
                        clocks_per_click: *c,
                        thirty_seconds_per_quarter: *t,
                    },
                    (META_TRACK_NAME, name) => {
                        EventKind::TrackName(String::from_utf8_lossy(name).into_owned())
                    }
                    _ => return Err(SmfError::UnsupportedStatus(meta_type)),
                };
                Ok((kind, end))
            }
            _ => Err(SmfError::UnsupportedStatus(status)),
        }
    }
}

/// An event at an absolute tick position within its track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEvent {
    pub tick: u32,
    pub kind: EventKind,
}

impl TrackEvent {
    pub fn new(tick: u32, kind: EventKind) -> Self {
        TrackEvent { tick, kind }
    }

    /// Canonical merge order: tick, then rank (note-off before note-on),
    /// then ascending key.
    pub fn sort_key(&self) -> (u32, u8, u8) {
        (self.tick, self.kind.rank(), self.kind.key())
    }
}
