//! Core data types for the pmpc polyphonic player.
//!
//! This crate defines the note stream encoding, the closed set of waveform
//! generators, per-track configuration and the `Song` container. Score
//! parsers emit a `Song`, and the playback engine borrows track data from it.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
mod generator;
pub mod song;
mod track_config;

pub use event::{events, EncodedEvent, Events, NoteEvent, MAX_REST_TICKS, NOTE_COUNT, REST_FLAG};
pub use generator::{Generator, ParseGeneratorError};
pub use song::{Song, TrackData};
pub use track_config::TrackConfig;
