//! Error types for keyplay-core.

use thiserror::Error;

/// Error type for playback, self-test and keymap operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No keymap selected")]
    NoKeymapSelected,

    #[error("Keymap not found: {0}")]
    KeymapNotFound(String),

    #[error("MIDI file not found: {0}")]
    SourceNotFound(String),

    #[error("Error loading MIDI: {0}")]
    DecodeFailed(String),

    #[error("No notes found")]
    NoNotes,

    /// User-initiated stop. Not a failure; sessions report it as `Stopped`.
    #[error("Playback cancelled")]
    Cancelled,

    #[error("Invalid key combo '{combo}': {reason}")]
    InvalidCombo { combo: String, reason: &'static str },

    #[error("Invalid keymap: {0}")]
    InvalidKeymap(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("A playback session is already active")]
    SessionActive,

    #[error("Playback worker panicked")]
    WorkerPanicked,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// `false` for a user-initiated stop, `true` for everything else.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
