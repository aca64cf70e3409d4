//! Decoded note events and the sources that produce them.

use crate::error::Result;
use crate::range::NoteRange;
use std::sync::Arc;

/// What a [`NoteEvent`] carries. Only `NoteOn` with velocity > 0 presses a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEventKind {
    NoteOn,
    NoteOff,
    /// Meta, controller and every other message; paced but never played.
    Other,
}

/// One message of a decoded recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Seconds since the previous event (>= 0).
    pub delta_time: f64,
    /// MIDI note number (0-127); 0 for `Other`.
    pub note: u8,
    /// Velocity (0-127); 0 for `Other`.
    pub velocity: u8,
    pub kind: NoteEventKind,
}

impl NoteEvent {
    pub fn note_on(delta_time: f64, note: u8, velocity: u8) -> Self {
        Self {
            delta_time,
            note,
            velocity,
            kind: NoteEventKind::NoteOn,
        }
    }

    pub fn note_off(delta_time: f64, note: u8) -> Self {
        Self {
            delta_time,
            note,
            velocity: 0,
            kind: NoteEventKind::NoteOff,
        }
    }

    pub fn other(delta_time: f64) -> Self {
        Self {
            delta_time,
            note: 0,
            velocity: 0,
            kind: NoteEventKind::Other,
        }
    }

    /// Any note-on, including velocity 0. Counts towards range statistics.
    #[inline]
    pub fn is_note_on(&self) -> bool {
        self.kind == NoteEventKind::NoteOn
    }

    /// Note-on with velocity > 0.
    #[inline]
    pub fn is_playable(&self) -> bool {
        self.is_note_on() && self.velocity > 0
    }
}

/// Buffered, replayable event sequence plus its nominal duration.
///
/// Cloning is cheap; the events are shared.
#[derive(Debug, Clone)]
pub struct EventStream {
    name: String,
    nominal_duration: f64,
    events: Arc<[NoteEvent]>,
}

impl EventStream {
    pub fn new(name: impl Into<String>, nominal_duration: f64, events: Vec<NoteEvent>) -> Self {
        Self {
            name: name.into(),
            nominal_duration,
            events: events.into(),
        }
    }

    /// Build from events, deriving the duration from the deltas.
    pub fn from_events(name: impl Into<String>, events: Vec<NoteEvent>) -> Self {
        let duration = events.iter().map(|e| e.delta_time).sum();
        Self::new(name, duration, events)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in seconds at 1x speed.
    pub fn nominal_duration(&self) -> f64 {
        self.nominal_duration
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Notes of every note-on event in stream order.
    pub fn note_on_notes(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter(|e| e.is_note_on() && e.note <= 127)
            .map(|e| e.note)
            .collect()
    }

    /// `(min, max)` over note-on events, `None` when there are none.
    pub fn note_range(&self) -> Option<NoteRange> {
        let notes = self.note_on_notes();
        let low = notes.iter().copied().min()?;
        let high = notes.iter().copied().max()?;
        Some((low, high))
    }
}

/// Something that can be decoded into an [`EventStream`] on the worker thread.
///
/// Implementations report missing inputs as `Error::SourceNotFound` and
/// malformed ones as `Error::DecodeFailed`.
pub trait NoteSource: Send {
    /// Display name used in status messages.
    fn name(&self) -> String;

    fn open(&self) -> Result<EventStream>;
}

impl NoteSource for EventStream {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn open(&self) -> Result<EventStream> {
        Ok(self.clone())
    }
}
