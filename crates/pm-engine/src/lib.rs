//! Synthesis core for the pmpc polyphonic player.
//!
//! Generates one unsigned 8-bit sample per call using only shifts, adds and
//! bitwise operations. A [`Mixer`] owns a fixed number of [`Track`]s, each
//! walking its note stream and driving one waveform generator. A
//! [`SampleSlot`] hands finished samples from the main loop to the timer
//! interrupt.

#![cfg_attr(not(feature = "std"), no_std)]

mod error;
mod frequency;
mod generator;
mod mixer;
pub mod pipeline;
mod track;

pub use error::EngineError;
pub use frequency::{note_to_increment, IncrementTable, INCREMENTS, INCR_STOP, SAMPLE_RATE};
pub use generator::{WaveState, NOISE_SEED, SILENCE, SQUARE_HIGH, SQUARE_LOW};
pub use mixer::{attenuation_for, EngineSettings, Mixer, DEFAULT_CAPACITY};
pub use pipeline::{Dac, SampleSlot, SampleSource};
pub use track::Track;
