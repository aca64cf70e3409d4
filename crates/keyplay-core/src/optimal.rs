//! Best-covering source sub-range for `OptimalRange` remapping.

use crate::range::NoteRange;

/// Range returned when a recording has no notes.
pub const FULL_RANGE: NoteRange = (0, 127);

/// Contiguous `[start, end]` over the distinct source notes that contains the
/// most distinct notes; ties keep the first pair in ascending scan order.
///
/// Over a set of distinct integers every candidate interval is dominated by
/// the one spanning the global extremes, so this is `(min, max)`. The keymap
/// range does not take part in the arithmetic.
pub fn find_optimal_range(notes: &[u8], _keymap_range: NoteRange) -> NoteRange {
    let low = notes.iter().copied().min();
    let high = notes.iter().copied().max();
    match (low, high) {
        (Some(low), Some(high)) => (low, high),
        _ => FULL_RANGE,
    }
}
