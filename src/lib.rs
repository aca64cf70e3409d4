//! # Keyplay - MIDI to keyboard player
//!
//! Replays MIDI files as synthesized key presses.
//!
//! ## Architecture
//!
//! Keyplay is an umbrella crate that coordinates:
//! - **keyplay-core** - Keymaps, range remapping, drift-free scheduling, sessions
//! - **keyplay-midi** - MIDI file decoding and directory library
//! - **keyplay-input** - Scancode tables and combo injection over a keyboard backend
//!
//! ## Quick Start
//!
//! ```ignore
//! use keyplay::prelude::*;
//!
//! let mut player = KeyPlayer::builder()
//!     .keymaps_path("keymap.json")
//!     .settings_path("settings.json")
//!     .build()?;
//!
//! player.set_keymap("piano")?;
//! player.set_range_mode(RangeMismatchMode::Scale);
//!
//! match player.check_range("song.mid")? {
//!     RangeCheck::Mismatch { keymap, midi } => println!("{:?} vs {:?}", midi, keymap),
//!     _ => {}
//! }
//!
//! let handle = player.play("song.mid", FnObserver::new().status(|s| println!("{}", s)))?;
//! handle.join()?;
//! ```

/// Re-export of keyplay-core for direct access
pub use keyplay_core as core;
/// Re-export of keyplay-input for custom keyboard backends
pub use keyplay_input as input;
/// Re-export of keyplay-midi for direct file access
pub use keyplay_midi as midi;

pub use keyplay_core::{
    find_optimal_range, scale_note, CancelFlag, ChannelObserver, Clock, EventScheduler,
    EventStream, FnObserver, KeyCombo, KeyInjector, Keymap, KeymapSet, ManualClock, Modifier,
    NoteEvent, NoteEventKind, NoteRange, NoteSource, NullObserver, PlaybackEvent,
    PlaybackObserver, PlaybackOutcome, PlaybackRequest, PlaybackSession, RangeMapper,
    RangeMismatchMode, RecordingInjector, SchedulerConfig, SelfTestRunner, SessionControl,
    SessionHandle, SessionState, SpeedConfig, Status, SystemClock,
};
pub use keyplay_input::{KeyboardBackend, LoggingBackend, ScancodeInjector};
pub use keyplay_midi::{MidiFile, MidiFileInfo, MidiFileSource, MidiLibrary};

mod builder;
mod error;
mod keymaps;
mod player;
pub mod settings;

pub use builder::KeyPlayerBuilder;
pub use error::{Error, Result};
pub use keymaps::{load_keymaps, KEYMAP_FILE};
pub use player::{KeyPlayer, RangeCheck};
pub use settings::Settings;

pub mod prelude {
    pub use crate::{
        ChannelObserver, Error, FnObserver, KeyCombo, KeyPlayer, KeyPlayerBuilder, Keymap,
        PlaybackEvent, PlaybackObserver, PlaybackOutcome, RangeCheck, RangeMismatchMode, Result,
        ScancodeInjector, Settings, SpeedConfig, Status,
    };
    pub use std::sync::Arc;
}
