//! Drift-free replay of an event stream as key presses.
//!
//! Pacing keeps a running `time_cursor` of scheduled source seconds and sleeps
//! only for the gap between where the run should be and where the clock says
//! it is, so per-event overhead is absorbed instead of accumulated.

use crate::cancel::CancelFlag;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::event::NoteSource;
use crate::inject::KeyInjector;
use crate::keymap::Keymap;
use crate::observer::{PlaybackObserver, Status};
use crate::range::{RangeMapper, RangeMismatchMode};
use crate::session::{conclude, PlaybackOutcome, SessionState, StateCell};
use crate::speed::SpeedConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Countdown ticks before the first event; 0 skips the countdown.
    pub countdown_ticks: u32,
    pub countdown_tick: Duration,
    /// Pause after each key of a self-test.
    pub test_note_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: 3,
            countdown_tick: Duration::from_secs(1),
            test_note_delay: Duration::from_millis(250),
        }
    }
}

/// Everything one playback run needs besides the shared collaborators.
pub struct PlaybackRequest {
    pub keymap: Option<Arc<Keymap>>,
    pub source: Box<dyn NoteSource>,
    pub mode: RangeMismatchMode,
    pub speed: SpeedConfig,
}

impl PlaybackRequest {
    pub fn new(keymap: Option<Arc<Keymap>>, source: Box<dyn NoteSource>) -> Self {
        Self {
            keymap,
            source,
            mode: RangeMismatchMode::default(),
            speed: SpeedConfig::default(),
        }
    }

    pub fn with_mode(mut self, mode: RangeMismatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_speed(mut self, speed: SpeedConfig) -> Self {
        self.speed = speed;
        self
    }
}

impl std::fmt::Debug for PlaybackRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackRequest")
            .field("keymap", &self.keymap.as_ref().and_then(|k| k.name().map(str::to_owned)))
            .field("source", &self.source.name())
            .field("mode", &self.mode)
            .field("speed", &self.speed)
            .finish()
    }
}

pub struct EventScheduler<'a> {
    clock: &'a dyn Clock,
    injector: &'a dyn KeyInjector,
    cancel: &'a CancelFlag,
    state: &'a StateCell,
    config: SchedulerConfig,
}

impl<'a> EventScheduler<'a> {
    pub fn new(
        clock: &'a dyn Clock,
        injector: &'a dyn KeyInjector,
        cancel: &'a CancelFlag,
        state: &'a StateCell,
    ) -> Self {
        Self {
            clock,
            injector,
            cancel,
            state,
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run to a terminal state. The terminal status is reported exactly once;
    /// a cancelled run returns `Ok(PlaybackOutcome::Stopped)`.
    pub fn play(
        &self,
        request: &PlaybackRequest,
        observer: &mut dyn PlaybackObserver,
    ) -> Result<PlaybackOutcome> {
        let result = self.run(request, observer);
        conclude(result, observer, self.state)
    }

    fn run(&self, request: &PlaybackRequest, observer: &mut dyn PlaybackObserver) -> Result<()> {
        let keymap = request.keymap.as_deref().ok_or(Error::NoKeymapSelected)?;
        let stream = request.source.open()?;

        let notes = stream.note_on_notes();
        let mapper =
            RangeMapper::for_notes(keymap, request.mode, &notes).ok_or(Error::NoNotes)?;

        let multiplier = request.speed.effective_multiplier(stream.nominal_duration());
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "speed multiplier must be positive, got {}",
                multiplier
            )));
        }

        info!(
            "Playing '{}': {} events, {:.2}s nominal at {:.2}x, mode {}, source range {:?}",
            stream.name(),
            stream.len(),
            stream.nominal_duration(),
            multiplier,
            request.mode,
            mapper.source_range()
        );

        self.countdown(observer)?;

        self.state.transition(SessionState::Running);
        observer.on_status(&Status::Playing(stream.name().to_string()));

        let events = stream.events();
        let total = events.len();
        let start = self.clock.now();
        let mut time_cursor = 0.0_f64;

        for (index, event) in events.iter().enumerate() {
            self.cancel.check()?;

            time_cursor += event.delta_time;
            // Scale the target time, not the remaining gap: dividing
            // `(time_cursor - elapsed)` instead would let the wall clock drift
            // back toward 1x and could never meet a target duration.
            let elapsed = self.clock.now().saturating_sub(start).as_secs_f64();
            let sleep_for = time_cursor / multiplier - elapsed;
            if sleep_for > 0.0 {
                if let Ok(wait) = Duration::try_from_secs_f64(sleep_for) {
                    self.clock.sleep(wait);
                }
            }

            if event.is_playable() {
                match mapper.resolve(event.note) {
                    Some(combo) => {
                        if !self.injector.press_combo(combo) {
                            debug!("Unrecognized key '{}' for note {}", combo, event.note);
                        }
                    }
                    None => debug!("Note {} dropped by {}", event.note, request.mode),
                }
            }

            observer.on_progress(index + 1, total);
        }

        Ok(())
    }

    fn countdown(&self, observer: &mut dyn PlaybackObserver) -> Result<()> {
        if self.config.countdown_ticks == 0 {
            return Ok(());
        }
        self.state.transition(SessionState::Countdown);
        for remaining in (1..=self.config.countdown_ticks).rev() {
            self.cancel.check()?;
            observer.on_status(&Status::Countdown(remaining));
            self.clock.sleep(self.config.countdown_tick);
        }
        Ok(())
    }
}
