// File container: `MThd` header chunk plus one `MTrk` chunk per track.
//
// Every chunk is a 4-byte ASCII tag, a 4-byte big-endian body length, then
// the body. The header body is three big-endian u16s: format, track count,
// and division (ticks per quarter note, metrical timing only).
//
// `parse_file` splits a file back into its header and raw track bodies; it
// does not interpret events (see `track::decode_track` for that).

use crate::error::{Result, SmfError};
use crate::track::TrackBuilder;

pub const HEADER_TAG: [u8; 4] = *b"MThd";
pub const TRACK_TAG: [u8; 4] = *b"MTrk";

/// SMF format type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Single multi-channel track.
    SingleTrack = 0,
    /// Simultaneous tracks sharing one tempo map.
    Parallel = 1,
    /// Independent sequential patterns.
    Sequential = 2,
}

impl Format {
    fn from_u16(v: u16) -> Option<Format> {
        match v {
            0 => Some(Format::SingleTrack),
            1 => Some(Format::Parallel),
            2 => Some(Format::Sequential),
            _ => None,
        }
    }
}

/// Parsed or to-be-written header chunk contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format: Format,
    pub track_count: u16,
    pub ticks_per_quarter: u16,
}

/// Append a tagged, length-prefixed chunk to `out`.
pub fn write_chunk(out: &mut Vec<u8>, tag: [u8; 4], body: &[u8]) -> Result<()> {
    let len = u32::try_from(body.len()).map_err(|_| SmfError::ChunkTooLarge(body.len()))?;
    out.extend_from_slice(&tag);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(body);
    Ok(())
}

/// Read one chunk from the front of `data`, checking its tag.
///
/// Returns the body slice and the total number of bytes consumed.
pub fn read_chunk(data: &[u8], expected: [u8; 4]) -> Result<(&[u8], usize)> {
    let head = data.get(..8).ok_or(SmfError::UnexpectedEof)?;
    let found = [head[0], head[1], head[2], head[3]];
    if found != expected {
        return Err(SmfError::BadChunkTag { expected, found });
    }
    let len = u32::from_be_bytes([head[4], head[5], head[6], head[7]]) as usize;
    let body = data.get(8..8 + len).ok_or(SmfError::UnexpectedEof)?;
    Ok((body, 8 + len))
}

/// Assemble a complete file from already-encoded track bodies.
pub fn build_file(format: Format, ticks_per_quarter: u16, tracks: &[Vec<u8>]) -> Result<Vec<u8>> {
    let track_count =
        u16::try_from(tracks.len()).map_err(|_| SmfError::TooManyTracks(tracks.len()))?;
    let mut header = Vec::with_capacity(6);
    header.extend_from_slice(&(format as u16).to_be_bytes());
    header.extend_from_slice(&track_count.to_be_bytes());
    header.extend_from_slice(&(ticks_per_quarter & 0x7FFF).to_be_bytes());

    let total: usize = tracks.iter().map(|t| t.len() + 8).sum();
    let mut out = Vec::with_capacity(14 + total);
    write_chunk(&mut out, HEADER_TAG, &header)?;
    for body in tracks {
        write_chunk(&mut out, TRACK_TAG, body)?;
    }
    Ok(out)
}

/// Encode each builder and assemble the file in one step.
pub fn encode_file(
    format: Format,
    ticks_per_quarter: u16,
    tracks: &[TrackBuilder],
) -> Result<Vec<u8>> {
    let bodies = tracks
        .iter()
        .map(TrackBuilder::encode)
        .collect::<Result<Vec<_>>>()?;
    build_file(format, ticks_per_quarter, &bodies)
}

/// Split a file into its header and raw track bodies.
pub fn parse_file(data: &[u8]) -> Result<(Header, Vec<&[u8]>)> {
    let (header_body, mut pos) = read_chunk(data, HEADER_TAG)?;
    if header_body.len() < 6 {
        return Err(SmfError::UnexpectedEof);
    }
    let word = |i: usize| u16::from_be_bytes([header_body[i], header_body[i + 1]]);
    let format = Format::from_u16(word(0)).ok_or(SmfError::UnknownFormat(word(0)))?;
    let header = Header {
        format,
        track_count: word(2),
        ticks_per_quarter: word(4),
    };
    let mut tracks = Vec::with_capacity(header.track_count as usize);
    for _ in 0..header.track_count {
        let (body, used) = read_chunk(&data[pos..], TRACK_TAG)?;
        tracks.push(body);
        pos += used;
    }
    Ok((header, tracks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn header_layout() {
        let file = build_file(Format::Parallel, 480, &[]).unwrap();
        assert_eq!(
            file,
            vec![b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 0, 0x01, 0xE0]
        );
    }

    #[test]
    fn track_chunks_are_length_prefixed() {
        let body = TrackBuilder::new().encode().unwrap();
        let file = build_file(Format::Parallel, 480, &[body.clone(), body]).unwrap();
        assert_eq!(&file[14..18], b"MTrk");
        assert_eq!(&file[18..22], &[0, 0, 0, 4]);
        assert_eq!(&file[22..26], &[0x00, 0xFF, 0x2F, 0x00]);
        assert_eq!(file.len(), 14 + 2 * 12);
    }

    #[test]
    fn parse_roundtrip() {
        let mut melody = TrackBuilder::new();
        melody.push(0, EventKind::NoteOn { channel: 0, key: 60, velocity: 90 });
        melody.push(480, EventKind::NoteOff { channel: 0, key: 60, velocity: 0 });
        let file =
            encode_file(Format::Parallel, 480, &[TrackBuilder::new(), melody.clone()]).unwrap();

        let (header, tracks) = parse_file(&file).unwrap();
        assert_eq!(
            header,
            Header { format: Format::Parallel, track_count: 2, ticks_per_quarter: 480 }
        );
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1], melody.encode().unwrap().as_slice());
    }

    #[test]
    fn wrong_tag_is_reported() {
        let err = read_chunk(b"RIFF\0\0\0\0", HEADER_TAG).unwrap_err();
        assert_eq!(err, SmfError::BadChunkTag { expected: HEADER_TAG, found: *b"RIFF" });
    }

    #[test]
    fn truncated_chunk() {
        let mut out = Vec::new();
        write_chunk(&mut out, TRACK_TAG, &[1, 2, 3, 4]).unwrap();
        assert_eq!(read_chunk(&out[..10], TRACK_TAG), Err(SmfError::UnexpectedEof));
    }
}
