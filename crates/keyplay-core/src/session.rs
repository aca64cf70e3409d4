//! Playback session lifecycle.
//!
//! A session runs one playback or self-test on a dedicated worker thread.
//! State moves `Idle -> Countdown -> Running -> {Completed | Stopped | Error}`;
//! terminal states never move again and a new run needs a new session.

use crate::cancel::CancelFlag;
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::inject::KeyInjector;
use crate::keymap::Keymap;
use crate::observer::{PlaybackObserver, Status};
use crate::scheduler::{EventScheduler, PlaybackRequest, SchedulerConfig};
use crate::self_test::SelfTestRunner;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SessionState {
    #[default]
    Idle = 0,
    Countdown = 1,
    Running = 2,
    Completed = 3,
    Stopped = 4,
    Error = 5,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SessionState::Countdown,
            2 => SessionState::Running,
            3 => SessionState::Completed,
            4 => SessionState::Stopped,
            5 => SessionState::Error,
            _ => SessionState::Idle,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Stopped | SessionState::Error
        )
    }

    /// Legal moves. Self-tests skip the countdown; validation failures and
    /// early stops jump straight from `Idle` to a terminal state.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match self {
            Idle => matches!(next, Countdown | Running | Stopped | Error),
            Countdown => matches!(next, Running | Stopped | Error),
            Running => matches!(next, Completed | Stopped | Error),
            Completed | Stopped | Error => false,
        }
    }
}

/// Shared, lock-free view of a session's state.
#[derive(Debug, Clone, Default)]
pub struct StateCell {
    state: Arc<AtomicU8>,
}

impl StateCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Apply `next` if legal from the current state. Returns whether it moved.
    pub fn transition(&self, next: SessionState) -> bool {
        let mut current = self.state.load(Ordering::SeqCst);
        loop {
            if !SessionState::from_u8(current).can_transition_to(next) {
                return false;
            }
            match self.state.compare_exchange(
                current,
                next as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Stopped,
}

/// Report the end of a run exactly once and settle the terminal state.
pub(crate) fn conclude(
    result: Result<()>,
    observer: &mut dyn PlaybackObserver,
    state: &StateCell,
) -> Result<PlaybackOutcome> {
    match result {
        Ok(()) => {
            state.transition(SessionState::Completed);
            observer.on_status(&Status::Completed);
            info!("Run completed");
            Ok(PlaybackOutcome::Completed)
        }
        Err(e) if !e.is_failure() => {
            state.transition(SessionState::Stopped);
            observer.on_status(&Status::Stopped);
            info!("Run stopped");
            Ok(PlaybackOutcome::Stopped)
        }
        Err(e) => {
            state.transition(SessionState::Error);
            observer.on_status(&Status::Error(e.to_string()));
            warn!("Run failed: {}", e);
            Err(e)
        }
    }
}

/// Run `work` on the worker, settling `Error` if it panics so the session
/// never stays active without a live worker.
fn run_guarded(
    state: &StateCell,
    work: impl FnOnce() -> Result<PlaybackOutcome>,
) -> Result<PlaybackOutcome> {
    match catch_unwind(AssertUnwindSafe(work)) {
        Ok(result) => result,
        Err(_) => {
            state.transition(SessionState::Error);
            error!("Worker panicked; session marked as failed");
            Err(Error::WorkerPanicked)
        }
    }
}

/// Spawns runs onto worker threads.
///
/// Holds the collaborators every run shares: clock, key injector and pacing
/// config.
#[derive(Clone)]
pub struct PlaybackSession {
    clock: Arc<dyn Clock>,
    injector: Arc<dyn KeyInjector>,
    config: SchedulerConfig,
}

impl PlaybackSession {
    pub fn new(injector: Arc<dyn KeyInjector>) -> Self {
        Self {
            clock: Arc::new(SystemClock::new()),
            injector,
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn start_playback(
        &self,
        request: PlaybackRequest,
        observer: impl PlaybackObserver + 'static,
    ) -> Result<SessionHandle> {
        let cancel = CancelFlag::new();
        let state = StateCell::new();
        let clock = Arc::clone(&self.clock);
        let injector = Arc::clone(&self.injector);
        let config = self.config.clone();
        let worker_cancel = cancel.clone();
        let worker_state = state.clone();
        let mut observer = observer;

        let thread = std::thread::Builder::new()
            .name("keyplay-playback".into())
            .spawn(move || {
                run_guarded(&worker_state, || {
                    EventScheduler::new(&*clock, &*injector, &worker_cancel, &worker_state)
                        .with_config(config)
                        .play(&request, &mut observer)
                })
            })?;

        debug!("Playback worker spawned");
        Ok(SessionHandle::new(cancel, state, thread))
    }

    pub fn start_self_test(
        &self,
        keymap: Option<Arc<Keymap>>,
        observer: impl PlaybackObserver + 'static,
    ) -> Result<SessionHandle> {
        let cancel = CancelFlag::new();
        let state = StateCell::new();
        let clock = Arc::clone(&self.clock);
        let injector = Arc::clone(&self.injector);
        let delay = self.config.test_note_delay;
        let worker_cancel = cancel.clone();
        let worker_state = state.clone();
        let mut observer = observer;

        let thread = std::thread::Builder::new()
            .name("keyplay-self-test".into())
            .spawn(move || {
                run_guarded(&worker_state, || {
                    SelfTestRunner::new(&*clock, &*injector, &worker_cancel, &worker_state)
                        .with_note_delay(delay)
                        .run(keymap.as_deref(), &mut observer)
                })
            })?;

        debug!("Self-test worker spawned");
        Ok(SessionHandle::new(cancel, state, thread))
    }
}

/// Caller-side control of one running session.
///
/// Dropping the handle detaches the worker; it still runs to a terminal state.
pub struct SessionHandle {
    cancel: CancelFlag,
    state: StateCell,
    thread: Option<JoinHandle<Result<PlaybackOutcome>>>,
}

impl SessionHandle {
    fn new(cancel: CancelFlag, state: StateCell, thread: JoinHandle<Result<PlaybackOutcome>>) -> Self {
        Self {
            cancel,
            state,
            thread: Some(thread),
        }
    }

    /// Ask the worker to stop. Takes effect at the next event or countdown tick.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Cloneable cancel/state view that outlives `join`.
    pub fn control(&self) -> SessionControl {
        SessionControl {
            cancel: self.cancel.clone(),
            state: self.state.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .map(|t| t.is_finished())
            .unwrap_or(true)
    }

    /// Block until the worker finishes.
    pub fn join(mut self) -> Result<PlaybackOutcome> {
        match self.thread.take() {
            Some(thread) => match thread.join() {
                Ok(result) => result,
                Err(_) => {
                    self.state.transition(SessionState::Error);
                    Err(Error::WorkerPanicked)
                }
            },
            None => Err(Error::WorkerPanicked),
        }
    }
}

/// Shared control of a session without ownership of its worker.
#[derive(Debug, Clone)]
pub struct SessionControl {
    cancel: CancelFlag,
    state: StateCell,
}

impl SessionControl {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Not yet in a terminal state.
    pub fn is_active(&self) -> bool {
        !self.state.get().is_terminal()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("state", &self.state())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
