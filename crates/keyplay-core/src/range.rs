//! Note remapping when a recording's span does not fit the keymap.
//!
//! [`resolve`] is a pure function of the note, the active
//! [`RangeMismatchMode`], the source range measured over the whole recording,
//! and the keymap. [`RangeMapper`] bundles those inputs for one playback run.

use crate::error::{Error, Result};
use crate::keymap::{KeyCombo, Keymap};
use crate::optimal::find_optimal_range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive `(low, high)` note range.
pub type NoteRange = (u8, u8);

/// Policy for notes that fall outside (or need fitting into) the keymap range.
///
/// Numeric ids are the ones stored in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RangeMismatchMode {
    /// Linear map of the source range onto the keymap range.
    Scale = 1,
    /// Ignore ranges, always take the nearest mapped key.
    NearestGlobal = 2,
    /// Drop notes outside the keymap range.
    #[default]
    Discard = 3,
    /// Shift so the lowest source note lands on `min_key`.
    AlignLow = 4,
    /// Shift so the highest source note lands on `max_key`.
    AlignHigh = 5,
    /// Scale using the best-covering source sub-range.
    OptimalRange = 6,
}

impl RangeMismatchMode {
    pub const ALL: [RangeMismatchMode; 6] = [
        RangeMismatchMode::Scale,
        RangeMismatchMode::NearestGlobal,
        RangeMismatchMode::Discard,
        RangeMismatchMode::AlignLow,
        RangeMismatchMode::AlignHigh,
        RangeMismatchMode::OptimalRange,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Map the three-option console player's choices (1, 2, 3).
    pub fn from_legacy(choice: u8) -> Option<Self> {
        match choice {
            1 => Some(RangeMismatchMode::Scale),
            2 => Some(RangeMismatchMode::NearestGlobal),
            3 => Some(RangeMismatchMode::Discard),
            _ => None,
        }
    }
}

impl TryFrom<u8> for RangeMismatchMode {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.id() == id)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown range mismatch mode {}", id)))
    }
}

impl From<RangeMismatchMode> for u8 {
    fn from(mode: RangeMismatchMode) -> Self {
        mode.id()
    }
}

impl fmt::Display for RangeMismatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RangeMismatchMode::Scale => "scale",
            RangeMismatchMode::NearestGlobal => "nearest",
            RangeMismatchMode::Discard => "discard",
            RangeMismatchMode::AlignLow => "align-low",
            RangeMismatchMode::AlignHigh => "align-high",
            RangeMismatchMode::OptimalRange => "optimal",
        };
        f.write_str(name)
    }
}

/// Linearly map `note` from `[old_min, old_max]` onto `[new_min, new_max]`.
///
/// Rounds half away from zero. A degenerate source range maps everything to
/// `new_min`.
pub fn scale_note(note: i32, old_min: i32, old_max: i32, new_min: i32, new_max: i32) -> i32 {
    if old_max == old_min {
        return new_min;
    }
    let scaled = (note - old_min) as f64 * (new_max - new_min) as f64
        / (old_max - old_min) as f64
        + new_min as f64;
    scaled.round() as i32
}

/// Target note for `note`, or `None` when the policy drops it.
pub fn map_note(
    note: u8,
    mode: RangeMismatchMode,
    source_range: NoteRange,
    keymap_range: NoteRange,
) -> Option<i32> {
    let note = note as i32;
    let (old_min, old_max) = (source_range.0 as i32, source_range.1 as i32);
    let (min_key, max_key) = (keymap_range.0 as i32, keymap_range.1 as i32);

    match mode {
        RangeMismatchMode::Scale | RangeMismatchMode::OptimalRange => {
            Some(scale_note(note, old_min, old_max, min_key, max_key))
        }
        RangeMismatchMode::NearestGlobal => Some(note),
        RangeMismatchMode::Discard => (min_key..=max_key).contains(&note).then_some(note),
        RangeMismatchMode::AlignLow => {
            let shifted = note + (min_key - old_min);
            (min_key..=max_key).contains(&shifted).then_some(shifted)
        }
        RangeMismatchMode::AlignHigh => {
            let shifted = note + (max_key - old_max);
            (min_key..=max_key).contains(&shifted).then_some(shifted)
        }
    }
}

/// Resolve a source note to a key combo under `mode`.
///
/// For [`RangeMismatchMode::OptimalRange`] the caller passes the sub-range from
/// [`find_optimal_range`] as `source_range`.
pub fn resolve<'k>(
    note: u8,
    mode: RangeMismatchMode,
    source_range: NoteRange,
    keymap: &'k Keymap,
) -> Option<&'k KeyCombo> {
    map_note(note, mode, source_range, keymap.range()).map(|target| keymap.resolve(target))
}

/// Remapping state for one run: keymap, policy and effective source range.
#[derive(Debug, Clone, Copy)]
pub struct RangeMapper<'k> {
    keymap: &'k Keymap,
    mode: RangeMismatchMode,
    source_range: NoteRange,
}

impl<'k> RangeMapper<'k> {
    pub fn new(keymap: &'k Keymap, mode: RangeMismatchMode, source_range: NoteRange) -> Self {
        Self {
            keymap,
            mode,
            source_range,
        }
    }

    /// Build from the distinct note-on notes of a recording.
    ///
    /// Returns `None` when the recording has no notes.
    pub fn for_notes(keymap: &'k Keymap, mode: RangeMismatchMode, notes: &[u8]) -> Option<Self> {
        let low = notes.iter().copied().min()?;
        let high = notes.iter().copied().max()?;
        let source_range = match mode {
            RangeMismatchMode::OptimalRange => find_optimal_range(notes, keymap.range()),
            _ => (low, high),
        };
        Some(Self::new(keymap, mode, source_range))
    }

    pub fn mode(&self) -> RangeMismatchMode {
        self.mode
    }

    /// Effective source range (the optimal sub-range for `OptimalRange`).
    pub fn source_range(&self) -> NoteRange {
        self.source_range
    }

    pub fn map_note(&self, note: u8) -> Option<i32> {
        map_note(note, self.mode, self.source_range, self.keymap.range())
    }

    pub fn resolve(&self, note: u8) -> Option<&'k KeyCombo> {
        resolve(note, self.mode, self.source_range, self.keymap)
    }
}
