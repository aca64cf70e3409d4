//! Status and progress reporting from the worker thread.
//!
//! Observers are called on the session's worker thread. Anything that touches
//! UI state has to marshal back to its own thread; [`ChannelObserver`] does
//! that by forwarding events over a channel.

use crate::keymap::KeyCombo;
use crossbeam_channel::{Receiver, Sender};
use std::fmt;

/// Human-facing run status. `Display` renders the UI string.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// Countdown tick, `N` seconds remaining.
    Countdown(u32),
    Playing(String),
    Testing(String),
    TestNote { note: u8, combo: KeyCombo },
    Stopped,
    Completed,
    Error(String),
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Stopped | Status::Completed | Status::Error(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Countdown(n) => write!(f, "Starting in {}...", n),
            Status::Playing(name) => write!(f, "Playing {}", name),
            Status::Testing(keymap) => write!(f, "Testing {}", keymap),
            Status::TestNote { note, combo } => write!(f, "Note {} -> {}", note, combo),
            Status::Stopped => f.write_str("Stopped"),
            Status::Completed => f.write_str("Completed"),
            Status::Error(reason) => write!(f, "Error: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Status(Status),
    Progress { current: usize, total: usize },
}

pub trait PlaybackObserver: Send {
    fn on_status(&mut self, _status: &Status) {}

    /// `current` counts processed items, so a finished run reports `(total, total)`.
    fn on_progress(&mut self, _current: usize, _total: usize) {}
}

impl<T: PlaybackObserver + ?Sized> PlaybackObserver for Box<T> {
    fn on_status(&mut self, status: &Status) {
        (**self).on_status(status)
    }

    fn on_progress(&mut self, current: usize, total: usize) {
        (**self).on_progress(current, total)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PlaybackObserver for NullObserver {}

type StatusFn = Box<dyn FnMut(&Status) + Send>;
type ProgressFn = Box<dyn FnMut(usize, usize) + Send>;

/// Closure-backed observer.
///
/// ```
/// use keyplay_core::FnObserver;
///
/// let observer = FnObserver::new()
///     .status(|s| println!("{}", s))
///     .progress(|current, total| println!("{}/{}", current, total));
/// ```
#[derive(Default)]
pub struct FnObserver {
    status: Option<StatusFn>,
    progress: Option<ProgressFn>,
}

impl FnObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, f: impl FnMut(&Status) + Send + 'static) -> Self {
        self.status = Some(Box::new(f));
        self
    }

    pub fn progress(mut self, f: impl FnMut(usize, usize) + Send + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for FnObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObserver")
            .field("status", &self.status.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl PlaybackObserver for FnObserver {
    fn on_status(&mut self, status: &Status) {
        if let Some(f) = self.status.as_mut() {
            f(status);
        }
    }

    fn on_progress(&mut self, current: usize, total: usize) {
        if let Some(f) = self.progress.as_mut() {
            f(current, total);
        }
    }
}

/// Forwards every callback as a [`PlaybackEvent`].
///
/// Sends never block. Once the receiver is dropped, events are discarded.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<PlaybackEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, Receiver<PlaybackEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl PlaybackObserver for ChannelObserver {
    fn on_status(&mut self, status: &Status) {
        let _ = self.tx.send(PlaybackEvent::Status(status.clone()));
    }

    fn on_progress(&mut self, current: usize, total: usize) {
        let _ = self.tx.send(PlaybackEvent::Progress { current, total });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_status_strings() {
        assert_eq!(Status::Countdown(3).to_string(), "Starting in 3...");
        assert_eq!(Status::Playing("song.mid".into()).to_string(), "Playing song.mid");
        assert_eq!(Status::Testing("piano".into()).to_string(), "Testing piano");
        assert_eq!(
            Status::TestNote {
                note: 61,
                combo: KeyCombo::parse("shift+a").unwrap()
            }
            .to_string(),
            "Note 61 -> shift+a"
        );
        assert_eq!(Status::Error("No notes found".into()).to_string(), "Error: No notes found");
        assert!(Status::Stopped.is_terminal());
        assert!(!Status::Countdown(1).is_terminal());
    }

    #[test]
    fn test_fn_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut observer = FnObserver::new().progress(move |c, t| sink.lock().push((c, t)));
        observer.on_status(&Status::Completed);
        observer.on_progress(1, 2);
        observer.on_progress(2, 2);
        assert_eq!(*seen.lock(), vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_channel_observer_survives_dropped_receiver() {
        let (mut observer, rx) = ChannelObserver::new();
        observer.on_status(&Status::Playing("a".into()));
        observer.on_progress(1, 1);
        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackEvent::Status(Status::Playing("a".into()))
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackEvent::Progress { current: 1, total: 1 }
        );
        drop(rx);
        observer.on_status(&Status::Completed);
    }
}
