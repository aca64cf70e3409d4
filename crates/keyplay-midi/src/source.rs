//! Library-backed [`NoteSource`].

use crate::library::MidiLibrary;
use keyplay_core::{EventStream, NoteSource};

/// A library file decoded on first `open`, on the worker thread.
#[derive(Debug, Clone)]
pub struct MidiFileSource {
    library: MidiLibrary,
    filename: String,
}

impl MidiFileSource {
    pub fn new(library: MidiLibrary, filename: impl Into<String>) -> Self {
        Self {
            library,
            filename: filename.into(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl NoteSource for MidiFileSource {
    fn name(&self) -> String {
        self.filename.clone()
    }

    fn open(&self) -> keyplay_core::Result<EventStream> {
        let file = self.library.load(&self.filename)?;
        Ok(file.into_stream(self.filename.clone()))
    }
}
