//! Song container.

use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::event::events;
use crate::generator::Generator;
use crate::track_config::TrackConfig;

/// Encoded data and static settings of one track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackData {
    /// Encoded note stream
    pub data: Vec<u8>,
    /// Assigned waveform generator
    pub generator: Generator,
    /// Rewind at end of stream
    pub looping: bool,
}

impl TrackData {
    pub fn new(data: Vec<u8>, generator: Generator) -> Self {
        Self {
            data,
            generator,
            looping: true,
        }
    }

    /// Total length of the track in ticks.
    pub fn duration_ticks(&self) -> u32 {
        events(&self.data).map(|e| e.ticks() as u32).sum()
    }

    /// Engine configuration borrowing this track's data.
    pub fn config(&self) -> TrackConfig<'_> {
        TrackConfig::new(&self.data, self.generator).looping(self.looping)
    }
}

/// A complete song: encoded tracks plus the constants shared by all tracks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    /// Song title
    pub title: ArrayString<32>,
    /// Output samples per sequencer tick
    pub samples_per_tick: u16,
    /// Right shift applied to every track before summing
    pub attenuation: u8,
    /// Tracks, one per voice
    pub tracks: Vec<TrackData>,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            title: ArrayString::new(),
            samples_per_tick: 1,
            attenuation: 0,
            tracks: Vec::new(),
        }
    }
}

impl Song {
    /// Create a new empty song.
    pub fn new(title: &str) -> Self {
        let mut song = Self::default();
        song.set_title(title);
        song
    }

    /// Set the title, truncated to the first 32 bytes on a char boundary.
    pub fn set_title(&mut self, title: &str) {
        self.title.clear();
        for c in title.chars() {
            if self.title.try_push(c).is_err() {
                break;
            }
        }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Enable or disable looping on every track.
    pub fn set_looping(&mut self, looping: bool) {
        for track in &mut self.tracks {
            track.looping = looping;
        }
    }

    /// Length of the longest track in ticks.
    pub fn duration_ticks(&self) -> u32 {
        self.tracks.iter().map(TrackData::duration_ticks).max().unwrap_or(0)
    }

    /// Length of the longest track in output samples.
    pub fn duration_samples(&self) -> u64 {
        self.duration_ticks() as u64 * self.samples_per_tick as u64
    }

    /// Engine configurations for every track, in order.
    pub fn track_configs(&self) -> impl Iterator<Item = TrackConfig<'_>> {
        self.tracks.iter().map(TrackData::config)
    }
}
