//! Keymap selection, library listing and range checks.

use crate::helpers::*;
use keyplay::prelude::*;

#[test]
fn test_keymaps_in_file_order() {
    let fixture = Fixture::new();
    let player = fixture.player();
    assert_eq!(player.keymap_names(), vec!["piano", "chords"]);
    assert_eq!(player.keymap_name(), None);
}

#[test]
fn test_list_and_info() {
    let fixture = Fixture::new();
    fixture.write_song("b.mid", &[60, 62], 480);
    fixture.write_song("a.MIDI", &[70], 240);
    std::fs::write(fixture.songs().join("readme.txt"), "x").unwrap();

    let player = fixture.player();
    assert_eq!(player.list_midi_files(), vec!["a.MIDI", "b.mid"]);

    let info = player.midi_info("b.mid").unwrap();
    assert_eq!(info.note_range, Some((60, 62)));
    assert!((info.duration - 1.0).abs() < 1e-9);
    assert!(matches!(player.midi_info("c.mid"), Err(Error::Midi(_))));
}

#[test]
fn test_range_check() {
    let fixture = Fixture::new();
    fixture.write_song("inside.mid", &[60, 64, 65], 120);
    fixture.write_song("outside.mid", &[58, 60, 67], 120);
    fixture.write_song("silent.mid", &[], 120);

    let mut player = fixture.player();
    player.set_keymap("piano").unwrap();

    assert_eq!(player.check_range("inside.mid").unwrap(), RangeCheck::Compatible);
    assert_eq!(
        player.check_range("outside.mid").unwrap(),
        RangeCheck::Mismatch {
            keymap: (60, 65),
            midi: (58, 67)
        }
    );
    assert_eq!(player.check_range("silent.mid").unwrap(), RangeCheck::NoNotes);
}

#[test]
fn test_second_directory_is_searched() {
    let fixture = Fixture::new();
    let extra = tempfile::TempDir::new().unwrap();
    write_song(&extra.path().join("far.mid"), &[62], 10);

    let mut player = fixture.player();
    assert!(player.midi_info("far.mid").is_err());
    player.add_midi_directory(extra.path()).unwrap();
    assert_eq!(player.list_midi_files(), vec!["far.mid"]);
    assert_eq!(player.midi_info("far.mid").unwrap().note_range, Some((62, 62)));
}
