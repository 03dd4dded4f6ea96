//! Waveform generators.
//!
//! Every generator takes the track's phase/noise state, produces one
//! unsigned 8-bit sample and advances the state. Only shifts, adds and
//! bitwise operations are used.

use pm_ir::Generator;

/// Mid-point of the unsigned 8-bit range.
pub const SILENCE: u8 = 0x80;

/// Square wave levels. Chosen so the square's RMS matches the ramps'.
pub const SQUARE_HIGH: u8 = 175;
pub const SQUARE_LOW: u8 = 83;

/// Initial LFSR state of a noise track.
pub const NOISE_SEED: u16 = 1;

/// LFSR tap paired with bit 14 for the short noise cycle.
const NOISE93_TAP: u32 = 8;
/// LFSR tap paired with bit 14 for the long noise cycle.
const NOISE32K_TAP: u32 = 13;

/// Oscillator state carried by a track between calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveState {
    /// Phase accumulator; hold counter for noise generators
    pub phase: u16,
    /// LFSR state; untouched by tonal generators
    pub noise: u16,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            phase: 0,
            noise: NOISE_SEED,
        }
    }
}

/// Produce the next sample of `generator`.
///
/// `note` is the last resolved pitch index; noise generators hold each
/// value for `note + 1` samples.
#[inline]
pub(crate) fn render(generator: Generator, state: &mut WaveState, increment: u16, note: u8) -> u8 {
    match generator {
        Generator::Sawtooth => sawtooth(state, increment),
        Generator::Triangle => triangle(state, increment),
        Generator::Square => square(state, increment),
        Generator::Noise93 => noise::<NOISE93_TAP>(state, note),
        Generator::Noise32k => noise::<NOISE32K_TAP>(state, note),
    }
}

#[inline]
fn sawtooth(state: &mut WaveState, increment: u16) -> u8 {
    let sample = (state.phase >> 8) as u8;
    state.phase = state.phase.wrapping_add(increment);
    sample
}

#[inline]
fn triangle(state: &mut WaveState, increment: u16) -> u8 {
    let w = state.phase;
    let sample = if w < 0x8000 {
        (w << 1) >> 8
    } else {
        // The peak (w == 0x8000) would be 256; hold it at 255.
        let fall = ((w - 0x8000) as u32) << 1;
        ((0x1_0000 - fall) >> 8).min(0xff) as u16
    };
    state.phase = w.wrapping_add(increment);
    sample as u8
}

#[inline]
fn square(state: &mut WaveState, increment: u16) -> u8 {
    let sample = if state.phase & 0x8000 != 0 {
        SQUARE_HIGH
    } else {
        SQUARE_LOW
    };
    state.phase = state.phase.wrapping_add(increment);
    sample
}

#[inline]
fn noise<const TAP: u32>(state: &mut WaveState, note: u8) -> u8 {
    state.phase = state.phase.wrapping_add(1);
    if state.phase > note as u16 {
        state.noise = clock_lfsr::<TAP>(state.noise);
        state.phase = 0;
    }
    state.noise as u8
}

/// Shift eight new bits into the register, each `bit14 ^ bit[TAP]`.
#[inline]
fn clock_lfsr<const TAP: u32>(mut word: u16) -> u16 {
    for _ in 0..8 {
        let bit = ((word >> 14) ^ (word >> TAP)) & 1;
        word = (word << 1) | bit;
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::INCREMENTS;

    fn run(generator: Generator, state: &mut WaveState, increment: u16, note: u8, n: usize) -> std::vec::Vec<u8> {
        (0..n).map(|_| render(generator, state, increment, note)).collect()
    }

    #[test]
    fn sawtooth_emits_high_byte_then_advances() {
        let mut s = WaveState { phase: 0x1234, noise: NOISE_SEED };
        assert_eq!(sawtooth(&mut s, 0x100), 0x12);
        assert_eq!(s.phase, 0x1334);
    }

    #[test]
    fn sawtooth_phase_wraps() {
        let mut s = WaveState { phase: 0xff00, noise: NOISE_SEED };
        assert_eq!(sawtooth(&mut s, 0x200), 0xff);
        assert_eq!(s.phase, 0x0100);
    }

    #[test]
    fn sawtooth_period_matches_increment() {
        // Over 65536 samples the accumulator wraps exactly `increment` times,
        // so the mean period is 65536 / increment; every single period is
        // that value rounded down or up.
        for (i, &inc) in INCREMENTS.iter().enumerate() {
            for start in [0u16, 0x3fff, 0xfffe] {
                let mut s = WaveState { phase: start, noise: NOISE_SEED };
                let mut wraps = 0u32;
                let mut last_wrap: Option<u32> = None;
                let exact = 65536 / inc as u32;
                for n in 0..65536u32 {
                    let before = s.phase;
                    sawtooth(&mut s, inc);
                    if s.phase < before {
                        if let Some(prev) = last_wrap {
                            let period = n - prev;
                            assert!(
                                period == exact || period == exact + 1,
                                "note {} period {} (expected ~{})",
                                i, period, exact
                            );
                        }
                        last_wrap = Some(n);
                        wraps += 1;
                    }
                }
                assert_eq!(wraps, inc as u32, "note {} start {:#x}", i, start);
            }
        }
    }

    #[test]
    fn triangle_is_symmetric() {
        for phase in 1u32..0x8000 {
            let mut up = WaveState { phase: phase as u16, noise: NOISE_SEED };
            let mut down = WaveState { phase: (0x1_0000 - phase) as u16, noise: NOISE_SEED };
            assert_eq!(triangle(&mut up, 0), triangle(&mut down, 0), "phase {:#x}", phase);
        }
    }

    #[test]
    fn triangle_extremes() {
        let mut s = WaveState::default();
        assert_eq!(triangle(&mut s, 0), 0);
        s.phase = 0x7fff;
        assert_eq!(triangle(&mut s, 0), 0xff);
        s.phase = 0x8000;
        assert_eq!(triangle(&mut s, 0), 0xff);
        s.phase = 0xffff;
        assert_eq!(triangle(&mut s, 0), 0);
    }

    #[test]
    fn triangle_peak_holds_at_255() {
        // The peak and one step either side are all 255.
        let mut s = WaveState { phase: 0x7f80, noise: NOISE_SEED };
        assert_eq!(run(Generator::Triangle, &mut s, 0x80, 0, 3), [0xff, 0xff, 0xff]);
    }

    #[test]
    fn triangle_advances_like_sawtooth() {
        let mut s = WaveState { phase: 0xfff0, noise: NOISE_SEED };
        triangle(&mut s, 0x20);
        assert_eq!(s.phase, 0x0010);
    }

    #[test]
    fn square_has_two_levels_each_half_the_range() {
        let mut high = 0u32;
        let mut low = 0u32;
        for phase in 0..=u16::MAX {
            let mut s = WaveState { phase, noise: NOISE_SEED };
            match square(&mut s, 1) {
                SQUARE_HIGH => high += 1,
                SQUARE_LOW => low += 1,
                other => panic!("unexpected level {}", other),
            }
        }
        assert_eq!(high, 0x8000);
        assert_eq!(low, 0x8000);
    }

    #[test]
    fn tonal_generators_leave_noise_state_alone() {
        for g in [Generator::Sawtooth, Generator::Triangle, Generator::Square] {
            let mut s = WaveState::default();
            run(g, &mut s, 1000, 60, 100);
            assert_eq!(s.noise, NOISE_SEED);
        }
    }

    fn eventual_period(samples: &[u8], max: usize) -> Option<usize> {
        // Skip the LFSR's one-clock lead-in before the cycle.
        let body = &samples[8..];
        (1..=max).find(|&p| body.iter().zip(&body[p..]).all(|(a, b)| a == b))
    }

    #[test]
    fn noise93_cycle_is_93_samples() {
        let mut s = WaveState::default();
        let out = run(Generator::Noise93, &mut s, 0, 0, 93 * 4);
        assert_eq!(eventual_period(&out, 93), Some(93));
    }

    #[test]
    fn noise32k_cycle_is_32767_samples() {
        let mut s = WaveState::default();
        let out = run(Generator::Noise32k, &mut s, 0, 0, 32767 * 2 + 64);
        assert_eq!(eventual_period(&out, 32767), Some(32767));
    }

    #[test]
    fn noise_ignores_increment() {
        for g in [Generator::Noise93, Generator::Noise32k] {
            let mut a = WaveState::default();
            let mut b = WaveState::default();
            assert_eq!(run(g, &mut a, 97, 3, 500), run(g, &mut b, 5871, 3, 500));
        }
    }

    #[test]
    fn noise_is_deterministic_from_seed() {
        let mut a = WaveState::default();
        let first = run(Generator::Noise32k, &mut a, 0, 5, 1000);
        let mut b = WaveState::default();
        assert_eq!(first, run(Generator::Noise32k, &mut b, 0, 5, 1000));
    }

    #[test]
    fn noise_holds_value_for_note_plus_one_samples() {
        let mut s = WaveState::default();
        let out = run(Generator::Noise93, &mut s, 0, 3, 40);
        // Counter starts at 0, so the first clock lands on the 4th sample.
        assert!(out[..3].iter().all(|&v| v == NOISE_SEED as u8));
        for chunk in out[3..39].chunks(4) {
            assert!(chunk.iter().all(|&v| v == chunk[0]));
        }
    }

    #[test]
    fn lfsr_clock_shifts_in_feedback() {
        // Seed 1: bits 14 and 8 are clear for all eight steps, so the
        // register is just shifted left by 8.
        assert_eq!(clock_lfsr::<NOISE93_TAP>(1), 0x0100);
        assert_eq!(clock_lfsr::<NOISE32K_TAP>(1), 0x0100);
    }
}
