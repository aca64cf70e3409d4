//! MIDI files looked up by name across a list of directories.

use crate::error::{Error, Result};
use crate::file::MidiFile;
use crate::source::MidiFileSource;
use keyplay_core::NoteRange;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extensions treated as MIDI, compared case-insensitively.
pub const MIDI_EXTENSIONS: &[&str] = &["mid", "midi"];

pub fn is_midi_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MIDI_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// Summary of one library file.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiFileInfo {
    pub filename: String,
    /// Seconds at the file's own tempo.
    pub duration: f64,
    pub note_range: Option<NoteRange>,
}

impl MidiFileInfo {
    pub fn has_notes(&self) -> bool {
        self.note_range.is_some()
    }
}

/// Ordered search path of MIDI directories. Earlier directories win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MidiLibrary {
    directories: Vec<PathBuf>,
}

impl MidiLibrary {
    pub fn new<P: Into<PathBuf>>(directories: impl IntoIterator<Item = P>) -> Self {
        Self {
            directories: directories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// First existing `<dir>/<filename>` in search order.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        self.directories
            .iter()
            .map(|dir| dir.join(filename))
            .find(|path| path.is_file())
            .ok_or_else(|| Error::NotFound(filename.to_string()))
    }

    /// Sorted, de-duplicated MIDI file names from every existing directory.
    pub fn list_files(&self) -> Vec<String> {
        let mut files = BTreeSet::new();
        for dir in &self.directories {
            if !dir.is_dir() {
                debug!("Skipping missing MIDI directory {}", dir.display());
                continue;
            }
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Cannot read MIDI directory {}: {}", dir.display(), e);
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && is_midi_file(&path) {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        files.insert(name.to_string());
                    }
                }
            }
        }
        files.into_iter().collect()
    }

    pub fn load(&self, filename: &str) -> Result<MidiFile> {
        let path = self.resolve(filename)?;
        debug!("Loading MIDI file {}", path.display());
        MidiFile::load(path)
    }

    pub fn info(&self, filename: &str) -> Result<MidiFileInfo> {
        let file = self.load(filename)?;
        Ok(MidiFileInfo {
            filename: filename.to_string(),
            duration: file.duration(),
            note_range: file.note_range(),
        })
    }

    /// Lazily decoded source for a playback run.
    pub fn source(&self, filename: impl Into<String>) -> MidiFileSource {
        MidiFileSource::new(self.clone(), filename)
    }
}
