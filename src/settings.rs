//! Persisted player settings (JSON).
//!
//! Loading fails soft: a missing or unreadable file yields defaults. Keys this
//! crate does not know are carried through a load/save cycle untouched.

use crate::Result;
use keyplay_core::{RangeMismatchMode, SpeedConfig};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SETTINGS_FILE: &str = "settings.json";

/// Default countdown before playback, in 1-second ticks.
pub const DEFAULT_COUNTDOWN: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub selected_keymap: Option<String>,
    /// Mode id 1-6. An unknown id loads as the default mode.
    #[serde(deserialize_with = "mode_or_default")]
    pub range_mismatch_handling: RangeMismatchMode,
    pub speed_multiplier: f64,
    /// Takes precedence over `speed_multiplier` when set.
    pub target_duration: Option<f64>,
    pub midi_directories: Vec<PathBuf>,
    pub countdown_duration: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn mode_or_default<'de, D>(deserializer: D) -> std::result::Result<RangeMismatchMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match serde_json::from_value::<RangeMismatchMode>(value.clone()) {
        Ok(mode) => Ok(mode),
        Err(e) => {
            warn!("Ignoring range_mismatch_handling {}: {}", value, e);
            Ok(RangeMismatchMode::default())
        }
    }
}

/// `~/Music`, or `Music` relative to the working directory without a home.
pub fn default_midi_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Music")
}

/// `<config dir>/keyplay/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("keyplay").join(SETTINGS_FILE))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_keymap: None,
            range_mismatch_handling: RangeMismatchMode::default(),
            speed_multiplier: 1.0,
            target_duration: None,
            midi_directories: vec![default_midi_directory()],
            countdown_duration: DEFAULT_COUNTDOWN,
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Load from `path`, falling back to defaults on any failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse settings JSON, migrating the legacy single `midi_directory` key.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(json)?;
        if let Value::Object(map) = &mut value {
            if !map.contains_key("midi_directories") {
                if let Some(dir) = map.remove("midi_directory") {
                    debug!("Migrating legacy midi_directory setting");
                    map.insert("midi_directories".into(), Value::Array(vec![dir]));
                }
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn speed(&self) -> SpeedConfig {
        match self.target_duration {
            Some(target) if target.is_finite() && target > 0.0 => {
                SpeedConfig::TargetDuration(target)
            }
            _ => SpeedConfig::Multiplier(self.speed_multiplier),
        }
    }

    /// Setting one of multiplier or target duration clears the other.
    pub fn set_speed(&mut self, speed: SpeedConfig) {
        match speed {
            SpeedConfig::Multiplier(m) => {
                self.speed_multiplier = m;
                self.target_duration = None;
            }
            SpeedConfig::TargetDuration(t) => {
                self.target_duration = Some(t);
                self.speed_multiplier = 1.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.range_mismatch_handling, RangeMismatchMode::Discard);
        assert_eq!(settings.speed(), SpeedConfig::Multiplier(1.0));
        assert_eq!(settings.countdown_duration, 3);
        assert!(settings.midi_directories[0].ends_with("Music"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_json(r#"{"range_mismatch_handling": 6}"#).unwrap();
        assert_eq!(settings.range_mismatch_handling, RangeMismatchMode::OptimalRange);
        assert_eq!(settings.countdown_duration, DEFAULT_COUNTDOWN);
    }

    #[test]
    fn test_legacy_directory_migrated() {
        let settings = Settings::from_json(r#"{"midi_directory": "/songs"}"#).unwrap();
        assert_eq!(settings.midi_directories, vec![PathBuf::from("/songs")]);
        assert!(!settings.extra.contains_key("midi_directory"));
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let settings =
            Settings::from_json(r#"{"selected_language": "zh", "window_topmost": true}"#).unwrap();
        let again = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(again.extra.get("selected_language"), Some(&Value::from("zh")));
        assert_eq!(again, settings);
    }

    #[test]
    fn test_bad_mode_keeps_other_fields() {
        let settings = Settings::from_json(
            r#"{"range_mismatch_handling": 9, "selected_keymap": "piano", "midi_directories": ["/songs"]}"#,
        )
        .unwrap();
        assert_eq!(settings.range_mismatch_handling, RangeMismatchMode::Discard);
        assert_eq!(settings.selected_keymap.as_deref(), Some("piano"));
        assert_eq!(settings.midi_directories, vec![PathBuf::from("/songs")]);

        let settings = Settings::from_json(r#"{"range_mismatch_handling": "scale"}"#).unwrap();
        assert_eq!(settings.range_mismatch_handling, RangeMismatchMode::Discard);
    }

    #[test]
    fn test_load_fails_soft() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(Settings::load(&missing), Settings::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert_eq!(Settings::load(&broken), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let mut settings = Settings::default();
        settings.selected_keymap = Some("piano".into());
        settings.set_speed(SpeedConfig::TargetDuration(90.0));
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.selected_keymap.as_deref(), Some("piano"));
        assert_eq!(loaded.speed(), SpeedConfig::TargetDuration(90.0));
        assert_relative_eq!(loaded.speed_multiplier, 1.0);
    }

    #[test]
    fn test_set_speed_clears_other() {
        let mut settings = Settings::default();
        settings.set_speed(SpeedConfig::TargetDuration(30.0));
        settings.set_speed(SpeedConfig::Multiplier(1.25));
        assert_eq!(settings.target_duration, None);
        assert_relative_eq!(settings.speed().effective_multiplier(100.0), 1.25);
    }
}
