// Error type for the generator pipeline.
//
// Generation itself cannot fail; errors come from the edges: reading a
// config file, encoding the SMF bytes, and parsing them back for
// verification. Writing the output file is handled separately by
// `midi::save_with_fallback`, which degrades to a base64 dump instead of
// returning an error.

use thiserror::Error;
use tunesmith_smf::SmfError;

#[derive(Debug, Error)]
pub enum MusicError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("SMF encoding error: {0}")]
    Smf(#[from] SmfError),
    #[error("MIDI read-back failed: {0}")]
    Midi(#[from] midly::Error),
}

pub type Result<T> = std::result::Result<T, MusicError>;
