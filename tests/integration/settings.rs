//! Settings persistence across player restarts.

use crate::helpers::*;
use keyplay::prelude::*;

#[test]
fn test_changes_survive_restart() {
    let fixture = Fixture::new();
    {
        let mut player = fixture.player();
        player.set_keymap("chords").unwrap();
        player.set_range_mode(RangeMismatchMode::AlignHigh);
        player.set_speed_multiplier(1.5).unwrap();
        player.set_countdown(1);
    }

    let player = fixture.player();
    assert_eq!(player.keymap_name(), Some("chords"));
    assert_eq!(player.range_mode(), RangeMismatchMode::AlignHigh);
    assert_eq!(player.speed(), SpeedConfig::Multiplier(1.5));
    assert_eq!(player.settings().countdown_duration, 1);
    assert_eq!(player.midi_directories(), &[fixture.songs()]);
}

#[test]
fn test_saved_file_uses_mode_ids() {
    let fixture = Fixture::new();
    let mut player = fixture.player();
    player.set_range_mode(RangeMismatchMode::OptimalRange);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(fixture.settings_path()).unwrap()).unwrap();
    assert_eq!(json["range_mismatch_handling"], 6);
    assert_eq!(json["target_duration"], serde_json::Value::Null);
}

#[test]
fn test_legacy_settings_file() {
    let fixture = Fixture::new();
    std::fs::write(
        fixture.settings_path(),
        format!(
            r#"{{"midi_directory": {:?}, "range_mismatch_handling": 1, "window_topmost": true}}"#,
            fixture.songs().to_string_lossy()
        ),
    )
    .unwrap();

    let mut player = fixture.player();
    assert_eq!(player.midi_directories(), &[fixture.songs()]);
    assert_eq!(player.range_mode(), RangeMismatchMode::Scale);

    player.set_countdown(0);
    let saved = std::fs::read_to_string(fixture.settings_path()).unwrap();
    assert!(saved.contains("window_topmost"));
    assert!(!saved.contains("\"midi_directory\""));
}

#[test]
fn test_corrupt_settings_fall_back() {
    let fixture = Fixture::new();
    std::fs::write(fixture.settings_path(), "{ nope").unwrap();
    let player = fixture.player();
    assert_eq!(player.range_mode(), RangeMismatchMode::Discard);
    assert_eq!(player.speed(), SpeedConfig::Multiplier(1.0));
}
