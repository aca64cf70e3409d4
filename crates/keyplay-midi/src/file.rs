//! MIDI File I/O
//!
//! Parses Standard MIDI Files with `midly` and flattens every track into one
//! seconds-based event list, the shape the scheduler replays.

use crate::error::Result;
use keyplay_core::{EventStream, NoteEvent, NoteRange};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::path::Path;
use tracing::debug;

/// Tempo assumed until the first tempo meta event (120 BPM).
pub const DEFAULT_TEMPO_US: u32 = 500_000;

/// A decoded MIDI file.
#[derive(Debug, Clone)]
pub struct MidiFile {
    /// Merged events, delta times in seconds.
    events: Vec<NoteEvent>,
    /// Seconds from the start to the last tick, trailing silence included.
    duration: f64,
    track_count: usize,
}

#[derive(Debug, Clone, Copy)]
enum RawKind {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    Tempo(u32),
    EndOfTrack,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct RawEvent {
    tick: u64,
    kind: RawKind,
}

/// Converts tick spans to seconds under the current tempo.
#[derive(Debug, Clone, Copy)]
enum TickClock {
    Metrical { ticks_per_beat: f64, us_per_beat: f64 },
    Timecode { seconds_per_tick: f64 },
}

impl TickClock {
    fn from_timing(timing: Timing) -> Self {
        match timing {
            Timing::Metrical(tpb) => TickClock::Metrical {
                ticks_per_beat: f64::from(tpb.as_int().max(1)),
                us_per_beat: f64::from(DEFAULT_TEMPO_US),
            },
            Timing::Timecode(fps, subframes) => TickClock::Timecode {
                seconds_per_tick: 1.0 / (f64::from(fps.as_f32()) * f64::from(subframes.max(1))),
            },
        }
    }

    fn seconds(&self, ticks: u64) -> f64 {
        match *self {
            TickClock::Metrical {
                ticks_per_beat,
                us_per_beat,
            } => ticks as f64 * us_per_beat / (ticks_per_beat * 1_000_000.0),
            TickClock::Timecode { seconds_per_tick } => ticks as f64 * seconds_per_tick,
        }
    }

    /// Timecode files have absolute timing; tempo events do not apply.
    fn set_tempo(&mut self, us_per_beat: u32) {
        if let TickClock::Metrical { us_per_beat: current, .. } = self {
            *current = f64::from(us_per_beat);
        }
    }
}

impl MidiFile {
    /// Load and parse a MIDI file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    /// Parse MIDI file from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;
        let mut clock = TickClock::from_timing(smf.header.timing);

        debug!(
            "Parsing MIDI file: {} tracks, timing {:?}",
            smf.tracks.len(),
            smf.header.timing
        );

        // Tracks are appended in order and the sort is stable, so events on
        // the same tick keep track order.
        let mut raw = Vec::new();
        for track in smf.tracks.iter() {
            let mut tick = 0u64;
            for event in track.iter() {
                tick += u64::from(event.delta.as_int());
                raw.push(RawEvent {
                    tick,
                    kind: Self::convert_event(&event.kind),
                });
            }
        }
        raw.sort_by_key(|e| e.tick);

        let mut events = Vec::with_capacity(raw.len());
        let mut last_tick = 0u64;
        let mut pending = 0.0;
        let mut duration = 0.0;

        for RawEvent { tick, kind } in raw {
            let delta = clock.seconds(tick - last_tick);
            last_tick = tick;
            pending += delta;
            duration += delta;

            let event = match kind {
                RawKind::NoteOn { note, velocity } => NoteEvent::note_on(pending, note, velocity),
                RawKind::NoteOff { note } => NoteEvent::note_off(pending, note),
                RawKind::Tempo(us) => {
                    clock.set_tempo(us);
                    NoteEvent::other(pending)
                }
                RawKind::Other => NoteEvent::other(pending),
                RawKind::EndOfTrack => continue,
            };
            events.push(event);
            pending = 0.0;
        }

        debug!(
            "Parsed {} MIDI events, duration: {:.2}s",
            events.len(),
            duration
        );

        Ok(Self {
            events,
            duration,
            track_count: smf.tracks.len(),
        })
    }

    fn convert_event(kind: &TrackEventKind) -> RawKind {
        match kind {
            TrackEventKind::Midi { message, .. } => match message {
                // Velocity 0 stays a note-on; range statistics count it.
                MidiMessage::NoteOn { key, vel } => RawKind::NoteOn {
                    note: key.as_int(),
                    velocity: vel.as_int(),
                },
                MidiMessage::NoteOff { key, .. } => RawKind::NoteOff { note: key.as_int() },
                _ => RawKind::Other,
            },
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => RawKind::Tempo(tempo.as_int()),
            TrackEventKind::Meta(MetaMessage::EndOfTrack) => RawKind::EndOfTrack,
            _ => RawKind::Other,
        }
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// Length in seconds at the file's own tempo.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn track_count(&self) -> usize {
        self.track_count
    }

    /// `(min, max)` over note-on events of any velocity.
    pub fn note_range(&self) -> Option<NoteRange> {
        let mut notes = self.events.iter().filter(|e| e.is_note_on()).map(|e| e.note);
        let first = notes.next()?;
        Some(notes.fold((first, first), |(lo, hi), n| (lo.min(n), hi.max(n))))
    }

    pub fn into_stream(self, name: impl Into<String>) -> EventStream {
        EventStream::new(name, self.duration, self.events)
    }
}
