//! Per-track note sequencer.

use pm_ir::{NoteEvent, TrackConfig};

use crate::frequency::{note_to_increment, IncrementTable, INCR_STOP};
use crate::generator::{render, WaveState, SILENCE};

/// Sequencing state for a single voice.
///
/// A track walks its note stream one event at a time. While an event's
/// sample budget lasts, every call produces one sample from the assigned
/// generator (or silence during a rest) and spends one sample of budget.
#[derive(Clone, Debug)]
pub struct Track<'a> {
    config: TrackConfig<'a>,
    /// Byte offset of the next event
    stream_pos: usize,
    /// Samples left before the next event is resolved
    remaining_samples: u32,
    /// Phase step of the current note, `INCR_STOP` while resting
    increment: u16,
    /// Phase accumulator and LFSR state
    wave: WaveState,
    /// Last resolved pitch index
    note: u8,
    /// Is the track still producing samples?
    active: bool,
}

impl<'a> Track<'a> {
    /// Create a track at the start of its stream.
    pub fn new(config: TrackConfig<'a>) -> Self {
        Self {
            config,
            stream_pos: 0,
            remaining_samples: 0,
            increment: INCR_STOP,
            wave: WaveState::default(),
            note: 0,
            active: config.playing,
        }
    }

    /// Return to the freshly created state, re-reading the initial flags.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Produce this track's next sample.
    #[inline]
    pub fn next_sample(&mut self, increments: &IncrementTable, samples_per_tick: u32) -> u8 {
        if !self.active {
            return SILENCE;
        }

        if self.remaining_samples == 0 && !self.resolve_next(increments, samples_per_tick) {
            return SILENCE;
        }

        let sample = if self.increment == INCR_STOP {
            SILENCE
        } else {
            render(self.config.generator, &mut self.wave, self.increment, self.note)
        };

        // Zero-tick events still occupy the sample that resolved them.
        self.remaining_samples = self.remaining_samples.saturating_sub(1);
        sample
    }

    /// Consume the next event. Returns `false` once the track has stopped.
    #[inline]
    fn resolve_next(&mut self, increments: &IncrementTable, samples_per_tick: u32) -> bool {
        match NoteEvent::decode(self.config.stream, self.stream_pos) {
            Some((NoteEvent::Rest { ticks }, len)) => {
                self.increment = INCR_STOP;
                self.wave.phase = 0;
                self.remaining_samples = ticks as u32 * samples_per_tick;
                self.stream_pos += len;
            }
            Some((NoteEvent::Note { pitch, ticks }, len)) => {
                self.increment = note_to_increment(increments, pitch);
                self.note = pitch;
                self.remaining_samples = ticks as u32 * samples_per_tick;
                self.stream_pos += len;
            }
            None if self.config.looping => {
                self.rewind();
                // One silent sample, then the first event resolves from phase 0.
                self.remaining_samples = 1;
            }
            None => {
                self.active = false;
                return false;
            }
        }
        true
    }

    fn rewind(&mut self) {
        self.wave.phase = 0;
        self.stream_pos = 0;
        self.remaining_samples = 0;
        self.increment = INCR_STOP;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining_samples(&self) -> u32 {
        self.remaining_samples
    }

    pub fn increment(&self) -> u16 {
        self.increment
    }

    pub fn phase(&self) -> u16 {
        self.wave.phase
    }

    pub fn noise_state(&self) -> u16 {
        self.wave.noise
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn stream_pos(&self) -> usize {
        self.stream_pos
    }

    pub fn stream_len(&self) -> usize {
        self.config.stream.len()
    }
}
