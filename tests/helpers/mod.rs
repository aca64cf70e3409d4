//! Test helpers and fixtures for keyplay integration tests
//!
//! Every fixture player runs on a [`ManualClock`] and a [`RecordingInjector`],
//! so playback finishes instantly and the pressed keys can be asserted.

use keyplay::prelude::*;
use keyplay::{ManualClock, RecordingInjector};
use midly::num::{u15, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Ticks per quarter note used by generated files.
pub const TEST_TPB: u16 = 480;

pub const KEYMAP_JSON: &str = r#"{
    "piano": {"60": "a", "62": "s", "64": "d", "65": "f"},
    "chords": {"48": "ctrl+z", "50": "ctrl+x", "52": "shift+c"}
}"#;

/// A temp workspace with `keymap.json`, a `songs/` directory and a settings path.
pub struct Fixture {
    pub dir: TempDir,
    pub injector: Arc<RecordingInjector>,
    pub clock: Arc<ManualClock>,
}

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join(keyplay::KEYMAP_FILE), KEYMAP_JSON)
            .expect("Failed to write keymap file");
        std::fs::create_dir(dir.path().join("songs")).expect("Failed to create songs dir");

        let settings = Settings {
            midi_directories: vec![dir.path().join("songs")],
            ..Settings::default()
        };
        settings
            .save(dir.path().join("settings.json"))
            .expect("Failed to write settings");

        Self {
            dir,
            injector: Arc::new(RecordingInjector::new()),
            clock: Arc::new(ManualClock::new()),
        }
    }

    pub fn songs(&self) -> PathBuf {
        self.dir.path().join("songs")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.path().join("settings.json")
    }

    pub fn builder(&self) -> KeyPlayerBuilder {
        KeyPlayer::builder()
            .keymaps_path(self.dir.path().join(keyplay::KEYMAP_FILE))
            .settings_path(self.settings_path())
            .injector(self.injector.clone())
            .clock(self.clock.clone())
    }

    pub fn player(&self) -> KeyPlayer {
        self.builder().build().expect("Failed to build player")
    }

    /// Write a one-track song: each note-on is `delta_ticks` after the previous.
    pub fn write_song(&self, name: &str, notes: &[u8], delta_ticks: u32) {
        write_song(&self.songs().join(name), notes, delta_ticks);
    }
}

pub fn write_song(path: &Path, notes: &[u8], delta_ticks: u32) {
    let mut track: Vec<TrackEvent> = Vec::new();
    for note in notes {
        track.push(TrackEvent {
            delta: u28::new(delta_ticks),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(*note),
                    vel: u7::new(100),
                },
            },
        });
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TEST_TPB)),
    ));
    smf.tracks.push(track);
    smf.save(path).expect("Failed to write MIDI file");
}

/// Status lines out of a stream of observer events.
pub fn status_lines(events: impl IntoIterator<Item = PlaybackEvent>) -> Vec<String> {
    events
        .into_iter()
        .filter_map(|e| match e {
            PlaybackEvent::Status(s) => Some(s.to_string()),
            PlaybackEvent::Progress { .. } => None,
        })
        .collect()
}
