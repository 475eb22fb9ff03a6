// Track encoding: absolute-tick events in, `MTrk` body bytes out.
//
// `TrackBuilder` collects events in any order. `encode` stable-sorts them by
// `TrackEvent::sort_key` (tick, note-off before note-on, ascending key),
// writes each as a VLQ delta time plus the event bytes, and closes the track
// with an end-of-track meta event. Any `EndOfTrack` pushed by the caller is
// dropped so the terminator always appears exactly once, at the end.
//
// `decode_track` is the inverse, used by tests and by read-back checks: it
// walks delta times and returns events with absolute ticks restored.

use crate::error::Result;
use crate::event::{EventKind, TrackEvent};
use crate::vlq::{read_vlq, write_vlq};

/// Accumulates events for one track.
#[derive(Debug, Clone, Default)]
pub struct TrackBuilder {
    events: Vec<TrackEvent>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: u32, kind: EventKind) {
        self.events.push(TrackEvent::new(tick, kind));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in canonical order, without the end-of-track marker.
    pub fn sorted_events(&self) -> Vec<TrackEvent> {
        let mut events: Vec<TrackEvent> = self
            .events
            .iter()
            .filter(|e| e.kind != EventKind::EndOfTrack)
            .cloned()
            .collect();
        events.sort_by_key(TrackEvent::sort_key);
        events
    }

    /// Encode to an `MTrk` body (no chunk header).
    pub fn encode(&self) -> Result<Vec<u8>> {
        let events = self.sorted_events();
        let mut out = Vec::with_capacity(events.len() * 4 + 4);
        let mut last_tick = 0u32;
        for event in &events {
            write_vlq(&mut out, event.tick - last_tick)?;
            event.kind.write_to(&mut out)?;
            last_tick = event.tick;
        }
        write_vlq(&mut out, 0)?;
        EventKind::EndOfTrack.write_to(&mut out)?;
        Ok(out)
    }
}

/// Decode an `MTrk` body into events with absolute ticks.
///
/// Stops after the end-of-track event (which is included in the output).
pub fn decode_track(body: &[u8]) -> Result<Vec<TrackEvent>> {
    let mut events = Vec::new();
    let mut pos = 0;
    let mut tick = 0u32;
    while pos < body.len() {
        let (delta, used) = read_vlq(&body[pos..])?;
        pos += used;
        tick = tick.saturating_add(delta);
        let (kind, used) = EventKind::read_from(&body[pos..])?;
        pos += used;
        let done = kind == EventKind::EndOfTrack;
        events.push(TrackEvent::new(tick, kind));
        if done {
            break;
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmfError;

    fn note_on(key: u8) -> EventKind {
        EventKind::NoteOn { channel: 0, key, velocity: 90 }
    }

    fn note_off(key: u8) -> EventKind {
        EventKind::NoteOff { channel: 0, key, velocity: 0 }
    }

    #[test]
    fn empty_track_is_just_end_of_track() {
        let body = TrackBuilder::new().encode().unwrap();
        assert_eq!(body, vec![0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn events_are_delta_encoded_in_order() {
        let mut track = TrackBuilder::new();
        // Pushed out of order on purpose.
        track.push(480, note_off(60));
        track.push(0, note_on(60));
        let body = track.encode().unwrap();
        assert_eq!(
            body,
            vec![
                0x00, 0x90, 60, 90, // on at 0
                0x83, 0x60, 0x80, 60, 0, // off at 480
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn equal_tick_ordering() {
        let mut track = TrackBuilder::new();
        track.push(480, note_on(67));
        track.push(480, note_on(64));
        track.push(480, note_off(72));
        track.push(480, note_off(60));
        let keys: Vec<(u8, u8)> = track
            .sorted_events()
            .iter()
            .map(|e| (e.kind.rank(), e.kind.key()))
            .collect();
        assert_eq!(keys, vec![(1, 60), (1, 72), (2, 64), (2, 67)]);
    }

    #[test]
    fn caller_end_of_track_is_not_duplicated() {
        let mut track = TrackBuilder::new();
        track.push(0, EventKind::EndOfTrack);
        track.push(10, note_on(60));
        let decoded = decode_track(&track.encode().unwrap()).unwrap();
        let eots = decoded.iter().filter(|e| e.kind == EventKind::EndOfTrack).count();
        assert_eq!(eots, 1);
        assert_eq!(decoded.last().map(|e| &e.kind), Some(&EventKind::EndOfTrack));
    }

    #[test]
    fn decode_restores_absolute_ticks() {
        let mut track = TrackBuilder::new();
        for i in 0..16u32 {
            track.push(i * 240, note_on(60 + i as u8));
            track.push(i * 240 + 200, note_off(60 + i as u8));
        }
        let decoded = decode_track(&track.encode().unwrap()).unwrap();
        assert_eq!(decoded.len(), 33);
        let mut prev = 0;
        for e in &decoded {
            assert!(e.tick >= prev);
            prev = e.tick;
        }
        assert_eq!(decoded[0].tick, 0);
        assert_eq!(decoded[1].tick, 200);
        assert_eq!(decoded[2].tick, 240);
    }

    #[test]
    fn truncated_body_is_an_error() {
        let mut track = TrackBuilder::new();
        track.push(0, note_on(60));
        let body = track.encode().unwrap();
        assert_eq!(decode_track(&body[..2]), Err(SmfError::UnexpectedEof));
    }
}
