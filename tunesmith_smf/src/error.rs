// Error type for SMF encoding and decoding.
//
// Encoding only fails on values the format cannot represent (delta times
// above 28 bits, more than 65535 tracks, chunks above 4 GiB). Decoding fails
// on truncated input or unexpected chunk tags.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SmfError {
    #[error("value {0} does not fit in a 4-byte variable-length quantity")]
    VlqOverflow(u32),
    #[error("unexpected end of data")]
    UnexpectedEof,
    #[error("expected chunk tag {expected:?}, found {found:?}")]
    BadChunkTag { expected: [u8; 4], found: [u8; 4] },
    #[error("too many tracks: {0} (max 65535)")]
    TooManyTracks(usize),
    #[error("chunk too large: {0} bytes")]
    ChunkTooLarge(usize),
    #[error("unknown SMF format {0}")]
    UnknownFormat(u16),
    #[error("unsupported event status byte {0:#04x}")]
    UnsupportedStatus(u8),
}

pub type Result<T> = std::result::Result<T, SmfError>;
