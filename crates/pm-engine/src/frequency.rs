//! Note-to-increment lookup.
//!
//! Each entry is the 16-bit phase step that makes a generator's accumulator
//! wrap at the note's frequency: `increment = round(65536 * freq / SAMPLE_RATE)`.

use pm_ir::NOTE_COUNT;

/// Output sampling rate the built-in table is computed for.
pub const SAMPLE_RATE: u32 = 22050;

/// Increment reserved for "silent": generators are not called.
pub const INCR_STOP: u16 = 0;

/// One phase increment per semitone.
pub type IncrementTable = [u16; NOTE_COUNT];

/// Six octaves from 32.7 Hz at 22050 Hz.
pub static INCREMENTS: IncrementTable = [
    97, 103, 109, 116, 122, 130, 137, 146, 154, 163, 173, 183,
    194, 206, 218, 231, 245, 259, 275, 291, 309, 327, 346, 367,
    389, 412, 436, 462, 490, 519, 550, 582, 617, 654, 693, 734,
    778, 824, 873, 925, 980, 1038, 1100, 1165, 1234, 1308, 1385, 1468,
    1555, 1647, 1745, 1849, 1959, 2076, 2199, 2330, 2468, 2615, 2771, 2936,
    3110, 3295, 3491, 3699, 3918, 4151, 4398, 4660, 4937, 5230, 5542, 5871,
];

/// Look up the phase increment for a pitch index.
///
/// Pitches outside the table resolve to [`INCR_STOP`].
#[inline]
pub fn note_to_increment(table: &IncrementTable, note: u8) -> u16 {
    table.get(note as usize).copied().unwrap_or(INCR_STOP)
}
