//! Keymaps, note-range remapping and drift-free replay of note events as key presses.
//!
//! # Primary API
//!
//! - [`Keymap`] / [`KeymapSet`]: note number to [`KeyCombo`] tables
//! - [`RangeMapper`]: fits a recording's note span onto a keymap ([`RangeMismatchMode`])
//! - [`EventScheduler`]: paced replay of an [`EventStream`]
//! - [`SelfTestRunner`]: presses every mapped key once
//! - [`PlaybackSession`] / [`SessionHandle`]: runs either on a worker thread
//!
//! Key presses go through the [`KeyInjector`] trait and recordings come from a
//! [`NoteSource`]; both live in sibling crates.
//!
//! # Example
//!
//! ```
//! use keyplay_core::{
//!     EventStream, Keymap, NoteEvent, NullObserver, PlaybackOutcome, PlaybackRequest,
//!     PlaybackSession, RangeMismatchMode, RecordingInjector, SchedulerConfig,
//! };
//! use std::sync::Arc;
//!
//! let keymap = Keymap::from_strings([(60, "a"), (62, "s"), (64, "d"), (65, "f")])?;
//! let stream = EventStream::from_events(
//!     "demo",
//!     vec![NoteEvent::note_on(0.0, 58, 90), NoteEvent::note_on(0.01, 67, 90)],
//! );
//! let injector = Arc::new(RecordingInjector::new());
//!
//! let session = PlaybackSession::new(injector.clone()).with_config(SchedulerConfig {
//!     countdown_ticks: 0,
//!     ..SchedulerConfig::default()
//! });
//! let request = PlaybackRequest::new(Some(Arc::new(keymap)), Box::new(stream))
//!     .with_mode(RangeMismatchMode::Scale);
//! let outcome = session.start_playback(request, NullObserver)?.join()?;
//!
//! assert_eq!(outcome, PlaybackOutcome::Completed);
//! assert_eq!(injector.pressed_strings(), vec!["a", "f"]);
//! # Ok::<(), keyplay_core::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod cancel;
pub use cancel::CancelFlag;

pub mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

mod event;
pub use event::{EventStream, NoteEvent, NoteEventKind, NoteSource};

pub mod keymap;
pub use keymap::{KeyCombo, Keymap, KeymapSet, Modifier, MAX_NOTE};

mod inject;
pub use inject::{KeyInjector, RecordingInjector};

mod observer;
pub use observer::{
    ChannelObserver, FnObserver, NullObserver, PlaybackEvent, PlaybackObserver, Status,
};

mod optimal;
pub use optimal::{find_optimal_range, FULL_RANGE};

pub mod range;
pub use range::{scale_note, NoteRange, RangeMapper, RangeMismatchMode};

mod scheduler;
pub use scheduler::{EventScheduler, PlaybackRequest, SchedulerConfig};

pub use self_test::{SelfTestRunner, DEFAULT_NOTE_DELAY};

mod session;
pub use session::{
    PlaybackOutcome, PlaybackSession, SessionControl, SessionHandle, SessionState, StateCell,
};

mod speed;
pub use speed::SpeedConfig;

pub mod prelude {
    pub use crate::{
        ChannelObserver, FnObserver, KeyCombo, KeyInjector, Keymap, KeymapSet, PlaybackEvent,
        PlaybackObserver, PlaybackOutcome, PlaybackRequest, PlaybackSession, RangeMismatchMode,
        SessionHandle, SpeedConfig, Status,
    };
}
