//! Time source for pacing.
//!
//! The scheduler only ever asks "how long since start" and "block for this
//! long", so both are behind [`Clock`]. [`ManualClock`] runs on virtual time
//! for deterministic tests and offline dry runs.

use parking_lot::Mutex;
use std::thread;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Block the calling thread.
    fn sleep(&self, duration: Duration);
}

/// Host monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    sleeps: Vec<Duration>,
}

/// Virtual clock: `sleep` advances time instantly and is recorded.
///
/// `with_step` adds a fixed amount after every `now()` read, standing in for
/// per-event processing overhead.
#[derive(Debug, Default)]
pub struct ManualClock {
    state: Mutex<ManualState>,
    step: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(step: Duration) -> Self {
        Self {
            state: Mutex::new(ManualState::default()),
            step,
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.state.lock().now += duration;
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.state.lock().sleeps.iter().sum()
    }

    /// Current virtual time without applying the step.
    pub fn peek(&self) -> Duration {
        self.state.lock().now
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let mut state = self.state.lock();
        let now = state.now;
        state.now += self.step;
        now
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.now += duration;
        state.sleeps.push(duration);
    }
}
