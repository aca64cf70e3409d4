//! Error types for MIDI decoding and file lookup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    MidiFileParse(String),

    #[error("MIDI file not found: {0}")]
    NotFound(String),
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::MidiFileParse(e.to_string())
    }
}

impl From<Error> for keyplay_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound(name) => keyplay_core::Error::SourceNotFound(name),
            Error::MidiFileParse(reason) => keyplay_core::Error::DecodeFailed(reason),
            Error::Io(io) => keyplay_core::Error::DecodeFailed(io.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_onto_core_taxonomy() {
        let core: keyplay_core::Error = Error::NotFound("song.mid".into()).into();
        assert!(matches!(core, keyplay_core::Error::SourceNotFound(ref n) if n == "song.mid"));

        let core: keyplay_core::Error = Error::MidiFileParse("bad header".into()).into();
        assert_eq!(core.to_string(), "Error loading MIDI: bad header");
    }
}
