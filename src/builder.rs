//! Builder for configuring and constructing a `KeyPlayer`.

use crate::keymaps::load_keymaps;
use crate::settings::Settings;
use crate::{KeyPlayer, Result};
use keyplay_core::{Clock, KeyInjector, KeymapSet, PlaybackSession, SchedulerConfig, SystemClock};
use keyplay_input::{LoggingBackend, ScancodeInjector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Keymaps come from an explicit set, a keymap file, or default to empty.
/// Settings come from an explicit value, the settings file (fail soft), or
/// defaults. Without an injector the player drives a [`LoggingBackend`], so
/// nothing reaches the real keyboard until a platform backend is supplied.
///
/// # Example
///
/// ```ignore
/// use keyplay::prelude::*;
///
/// let player = KeyPlayer::builder()
///     .keymaps_path("keymap.json")
///     .settings_path("settings.json")
///     .injector(Arc::new(ScancodeInjector::new(my_backend)))
///     .build()?;
/// ```
#[derive(Default)]
pub struct KeyPlayerBuilder {
    keymaps: Option<KeymapSet>,
    keymaps_path: Option<PathBuf>,
    settings: Option<Settings>,
    settings_path: Option<PathBuf>,
    injector: Option<Arc<dyn KeyInjector>>,
    clock: Option<Arc<dyn Clock>>,
    test_note_delay: Option<Duration>,
}

impl KeyPlayerBuilder {
    pub fn keymaps(mut self, keymaps: KeymapSet) -> Self {
        self.keymaps = Some(keymaps);
        self
    }

    /// Ignored when `keymaps` is also set.
    pub fn keymaps_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.keymaps_path = Some(path.into());
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Where settings are loaded from (unless given explicitly) and saved to.
    pub fn settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn injector(mut self, injector: Arc<dyn KeyInjector>) -> Self {
        self.injector = Some(injector);
        self
    }

    /// Default: host monotonic clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Default: 250 ms
    pub fn test_note_delay(mut self, delay: Duration) -> Self {
        self.test_note_delay = Some(delay);
        self
    }

    pub fn build(self) -> Result<KeyPlayer> {
        let keymaps = match (self.keymaps, &self.keymaps_path) {
            (Some(keymaps), _) => keymaps,
            (None, Some(path)) => load_keymaps(path)?,
            (None, None) => KeymapSet::new(),
        };

        let settings = match (self.settings, &self.settings_path) {
            (Some(settings), _) => settings,
            (None, Some(path)) => Settings::load(path),
            (None, None) => Settings::default(),
        };

        let injector = self
            .injector
            .unwrap_or_else(|| Arc::new(ScancodeInjector::new(LoggingBackend)));
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));

        let mut config = SchedulerConfig {
            countdown_ticks: settings.countdown_duration,
            ..SchedulerConfig::default()
        };
        if let Some(delay) = self.test_note_delay {
            config.test_note_delay = delay;
        }

        debug!(
            "Building player: {} keymaps, settings path {:?}",
            keymaps.len(),
            self.settings_path
        );

        let session = PlaybackSession::new(injector)
            .with_clock(clock)
            .with_config(config);

        Ok(KeyPlayer::from_parts(
            settings,
            self.settings_path,
            keymaps,
            session,
        ))
    }
}
