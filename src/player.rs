//! KeyPlayer that ties keymaps, settings, the MIDI library and sessions together

use crate::settings::Settings;
use crate::Result;
use keyplay_core::{
    Keymap, KeymapSet, NoteRange, PlaybackObserver, PlaybackRequest, PlaybackSession,
    RangeMismatchMode, SchedulerConfig, SessionControl, SessionHandle, SpeedConfig,
};
use keyplay_midi::{MidiFileInfo, MidiLibrary};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of comparing a file's note span with the selected keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCheck {
    /// Every note falls inside the keymap range.
    Compatible,
    Mismatch { keymap: NoteRange, midi: NoteRange },
    /// No note-on events, or the file could not be read.
    NoNotes,
}

/// Player facade over one keymap set and one settings file.
///
/// At most one playback or self-test runs at a time; starting another while
/// one is active fails with `SessionActive`.
///
/// # Example
///
/// ```ignore
/// use keyplay::prelude::*;
///
/// let mut player = KeyPlayer::builder()
///     .keymaps_path("keymap.json")
///     .settings_path("settings.json")
///     .build()?;
///
/// player.set_keymap("piano")?;
/// let handle = player.play("song.mid", FnObserver::new().status(|s| println!("{}", s)))?;
/// handle.join()?;
/// ```
pub struct KeyPlayer {
    settings: Settings,
    settings_path: Option<PathBuf>,
    keymaps: KeymapSet,
    session: PlaybackSession,
    active: Mutex<Option<SessionControl>>,
}

impl KeyPlayer {
    /// Create a new player builder
    pub fn builder() -> crate::KeyPlayerBuilder {
        crate::KeyPlayerBuilder::default()
    }

    pub(crate) fn from_parts(
        settings: Settings,
        settings_path: Option<PathBuf>,
        keymaps: KeymapSet,
        session: PlaybackSession,
    ) -> Self {
        Self {
            settings,
            settings_path,
            keymaps,
            session,
            active: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }

    /// Write settings to the configured path. No-op without one.
    pub fn save_settings(&self) -> Result<()> {
        match &self.settings_path {
            Some(path) => self.settings.save(path),
            None => Ok(()),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.save_settings() {
            warn!("Error saving settings: {}", e);
        }
    }

    // =========================================================================
    // Keymaps
    // =========================================================================

    pub fn keymaps(&self) -> &KeymapSet {
        &self.keymaps
    }

    pub fn keymap_names(&self) -> Vec<&str> {
        self.keymaps.names()
    }

    pub fn set_keymap(&mut self, name: &str) -> Result<()> {
        self.keymaps.get(name)?;
        self.settings.selected_keymap = Some(name.to_string());
        info!("Selected keymap '{}'", name);
        self.persist();
        Ok(())
    }

    pub fn keymap_name(&self) -> Option<&str> {
        self.settings.selected_keymap.as_deref()
    }

    /// Selected keymap, if it exists in the loaded set.
    pub fn current_keymap(&self) -> Option<Arc<Keymap>> {
        let name = self.keymap_name()?;
        self.keymaps.get(name).ok()
    }

    pub fn keymap_range(&self) -> Option<NoteRange> {
        self.current_keymap().map(|k| k.range())
    }

    // =========================================================================
    // Playback settings
    // =========================================================================

    pub fn speed(&self) -> SpeedConfig {
        self.settings.speed()
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f64) -> Result<()> {
        self.settings.set_speed(SpeedConfig::multiplier(multiplier)?);
        self.persist();
        Ok(())
    }

    pub fn set_target_duration(&mut self, seconds: f64) -> Result<()> {
        self.settings.set_speed(SpeedConfig::target_duration(seconds)?);
        self.persist();
        Ok(())
    }

    pub fn range_mode(&self) -> RangeMismatchMode {
        self.settings.range_mismatch_handling
    }

    pub fn set_range_mode(&mut self, mode: RangeMismatchMode) {
        self.settings.range_mismatch_handling = mode;
        self.persist();
    }

    /// Countdown ticks before playback; 0 disables it.
    pub fn set_countdown(&mut self, ticks: u32) {
        self.settings.countdown_duration = ticks;
        self.persist();
    }

    // =========================================================================
    // MIDI library
    // =========================================================================

    pub fn midi_directories(&self) -> &[PathBuf] {
        &self.settings.midi_directories
    }

    /// Append an existing directory to the search path. Adding one twice is a no-op.
    pub fn add_midi_directory(&mut self, dir: impl Into<PathBuf>) -> Result<()> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(crate::Error::NotADirectory(dir));
        }
        if !self.settings.midi_directories.contains(&dir) {
            debug!("Adding MIDI directory {}", dir.display());
            self.settings.midi_directories.push(dir);
            self.persist();
        }
        Ok(())
    }

    /// Returns whether the directory was in the search path.
    pub fn remove_midi_directory(&mut self, dir: impl AsRef<Path>) -> bool {
        let dir = dir.as_ref();
        let before = self.settings.midi_directories.len();
        self.settings.midi_directories.retain(|d| d != dir);
        let removed = self.settings.midi_directories.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn library(&self) -> MidiLibrary {
        MidiLibrary::new(self.settings.midi_directories.iter().cloned())
    }

    pub fn list_midi_files(&self) -> Vec<String> {
        self.library().list_files()
    }

    pub fn midi_info(&self, filename: &str) -> Result<MidiFileInfo> {
        Ok(self.library().info(filename)?)
    }

    /// Compare a file's note span with the selected keymap.
    ///
    /// Unreadable files report `NoNotes`; only a missing keymap is an error.
    pub fn check_range(&self, filename: &str) -> Result<RangeCheck> {
        let keymap = self
            .current_keymap()
            .ok_or(keyplay_core::Error::NoKeymapSelected)?;

        let midi = match self.midi_info(filename) {
            Ok(info) => info.note_range,
            Err(e) => {
                warn!("Cannot read '{}' for range check: {}", filename, e);
                None
            }
        };
        let Some((low, high)) = midi else {
            return Ok(RangeCheck::NoNotes);
        };

        let (min_key, max_key) = keymap.range();
        if low >= min_key && high <= max_key {
            Ok(RangeCheck::Compatible)
        } else {
            Ok(RangeCheck::Mismatch {
                keymap: (min_key, max_key),
                midi: (low, high),
            })
        }
    }

    // =========================================================================
    // Runs
    // =========================================================================

    fn scheduled_session(&self) -> PlaybackSession {
        let config = SchedulerConfig {
            countdown_ticks: self.settings.countdown_duration,
            ..self.session.config().clone()
        };
        self.session.clone().with_config(config)
    }

    /// Reserve the single run slot and start a run in it.
    fn start(&self, run: impl FnOnce() -> keyplay_core::Result<SessionHandle>) -> Result<SessionHandle> {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|c| c.is_active()) {
            return Err(keyplay_core::Error::SessionActive.into());
        }
        let handle = run()?;
        *active = Some(handle.control());
        Ok(handle)
    }

    /// Play a library file with the selected keymap and current settings.
    pub fn play(
        &self,
        filename: &str,
        observer: impl PlaybackObserver + 'static,
    ) -> Result<SessionHandle> {
        let request = PlaybackRequest::new(
            self.current_keymap(),
            Box::new(self.library().source(filename)),
        )
        .with_mode(self.range_mode())
        .with_speed(self.speed());

        info!("Starting playback of '{}'", filename);
        let session = self.scheduled_session();
        self.start(move || session.start_playback(request, observer))
    }

    /// Press every key of the selected keymap once.
    pub fn test_keymap(&self, observer: impl PlaybackObserver + 'static) -> Result<SessionHandle> {
        let keymap = self.current_keymap();
        let session = self.session.clone();
        self.start(move || session.start_self_test(keymap, observer))
    }

    /// Signal the active run to stop. Returns whether one was running.
    pub fn stop(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(control) if control.is_active() => {
                control.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|c| c.is_active())
    }
}

impl std::fmt::Debug for KeyPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPlayer")
            .field("keymaps", &self.keymaps.names())
            .field("settings", &self.settings)
            .field("running", &self.is_running())
            .finish()
    }
}
