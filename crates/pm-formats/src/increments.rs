//! Phase increment table builder.
//!
//! Builds the 72-entry lookup the engine uses to turn a pitch index into a
//! phase step. Floating point is fine here: tables are built once, off the
//! sample path.

use pm_engine::IncrementTable;
use pm_ir::NOTE_COUNT;

use crate::FormatError;

/// Frequency of pitch index 0.
pub const DEFAULT_ROOT_HZ: f64 = 32.7;

/// 2^(1/12).
pub const SEMITONE_RATIO: f64 = 1.059_463_094_359_295_3;

/// `round(65536 / (sample_rate / f))` for 72 semitones starting at `root_hz`.
pub fn build_increment_table(sample_rate: u32, root_hz: f64) -> Result<IncrementTable, FormatError> {
    if sample_rate == 0 || !root_hz.is_finite() || root_hz <= 0.0 {
        return Err(FormatError::InvalidTableInput {
            sample_rate,
            root_hz: root_hz.to_string(),
        });
    }

    let mut table = [0u16; NOTE_COUNT];
    let mut freq = root_hz;
    for (note, slot) in table.iter_mut().enumerate() {
        let increment = libm::round(65536.0 / (sample_rate as f64 / freq));
        if !(1.0..=u16::MAX as f64).contains(&increment) {
            return Err(FormatError::IncrementOutOfRange {
                note,
                increment: increment as u64,
            });
        }
        *slot = increment as u16;
        freq *= SEMITONE_RATIO;
    }

    log::debug!(
        "increment table at {} Hz from {} Hz: {}..={}",
        sample_rate,
        root_hz,
        table[0],
        table[NOTE_COUNT - 1]
    );
    Ok(table)
}
