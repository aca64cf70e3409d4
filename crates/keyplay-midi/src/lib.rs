//! MIDI file decoding and lookup for keyplay.
//!
//! - [`MidiFile`]: Standard MIDI File to a seconds-based event list
//! - [`MidiLibrary`]: find, list and summarize files across directories
//! - [`MidiFileSource`]: a library file as a [`keyplay_core::NoteSource`]

pub mod error;
pub use error::{Error, Result};

mod file;
pub use file::{MidiFile, DEFAULT_TEMPO_US};

mod library;
pub use library::{is_midi_file, MidiFileInfo, MidiLibrary, MIDI_EXTENSIONS};

mod source;
pub use source::MidiFileSource;
