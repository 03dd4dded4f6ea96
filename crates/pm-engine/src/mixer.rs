//! Multi-track mixer.

use heapless::Vec;
use pm_ir::{Song, TrackConfig};

use crate::error::EngineError;
use crate::frequency::IncrementTable;
use crate::generator::SILENCE;
use crate::pipeline::SampleSource;
use crate::track::Track;

/// Track capacity used by the host-side player.
pub const DEFAULT_CAPACITY: usize = 8;

/// Smallest attenuation exponent that mixes `tracks` tracks without
/// overflow: `ceil(log2(tracks))`.
pub const fn attenuation_for(tracks: usize) -> u8 {
    let mut exponent = 0u8;
    while exponent < 7 && (1usize << exponent) < tracks {
        exponent += 1;
    }
    exponent
}

/// Can `tracks` offsets in `-128..=127`, each shifted right by `exponent`,
/// be summed around 128 without leaving a byte?
const fn fits(tracks: usize, exponent: u8) -> bool {
    tracks * (127usize >> exponent) <= 127 && tracks * (128usize >> exponent) <= 128
}

/// Constants shared by every track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    /// Output samples per sequencer tick
    pub samples_per_tick: u16,
    /// Right shift applied to each track's offset from silence
    pub attenuation: u8,
}

impl EngineSettings {
    pub fn from_song(song: &Song) -> Self {
        Self {
            samples_per_tick: song.samples_per_tick,
            attenuation: song.attenuation,
        }
    }
}

/// Sums up to `N` tracks into one unsigned 8-bit sample.
///
/// Tracks are stored inline; the mixer never allocates.
pub struct Mixer<'a, const N: usize> {
    tracks: Vec<Track<'a>, N>,
    increments: &'a IncrementTable,
    samples_per_tick: u32,
    attenuation: u8,
}

impl<'a, const N: usize> Mixer<'a, N> {
    /// Create an empty mixer.
    pub fn new(increments: &'a IncrementTable, settings: EngineSettings) -> Result<Self, EngineError> {
        if settings.samples_per_tick == 0 {
            return Err(EngineError::ZeroSamplesPerTick);
        }
        if settings.attenuation > 7 {
            return Err(EngineError::Attenuation {
                tracks: 0,
                exponent: settings.attenuation,
            });
        }
        Ok(Self {
            tracks: Vec::new(),
            increments,
            samples_per_tick: settings.samples_per_tick as u32,
            attenuation: settings.attenuation,
        })
    }

    /// Create a mixer with every track of `song`.
    pub fn from_song(increments: &'a IncrementTable, song: &'a Song) -> Result<Self, EngineError> {
        let mut mixer = Self::new(increments, EngineSettings::from_song(song))?;
        for config in song.track_configs() {
            mixer.add_track(config)?;
        }
        Ok(mixer)
    }

    /// Add a track. Fails if the mixer is full or if one more track would
    /// let the sum leave `0..=255` at the configured attenuation.
    pub fn add_track(&mut self, config: TrackConfig<'a>) -> Result<(), EngineError> {
        let tracks = self.tracks.len() + 1;
        if !fits(tracks, self.attenuation) {
            return Err(EngineError::Attenuation {
                tracks,
                exponent: self.attenuation,
            });
        }
        self.tracks
            .push(Track::new(config))
            .map_err(|_| EngineError::TooManyTracks { capacity: N })
    }

    /// Mix one output sample, advancing every track by one sample.
    #[inline]
    pub fn next_sample(&mut self) -> u8 {
        let mut acc: i16 = 0;
        for track in self.tracks.iter_mut() {
            let sample = track.next_sample(self.increments, self.samples_per_tick);
            acc += (sample as i16 - SILENCE as i16) >> self.attenuation;
        }
        (acc + SILENCE as i16) as u8
    }

    /// Every track has stopped.
    pub fn is_finished(&self) -> bool {
        self.tracks.iter().all(|t| !t.is_active())
    }

    /// Put every track back at the start of its stream.
    pub fn reset(&mut self) {
        for track in self.tracks.iter_mut() {
            track.reset();
        }
    }

    pub fn tracks(&self) -> &[Track<'a>] {
        &self.tracks
    }

    pub fn attenuation(&self) -> u8 {
        self.attenuation
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.samples_per_tick
    }
}

impl<const N: usize> SampleSource for Mixer<'_, N> {
    #[inline]
    fn next_sample(&mut self) -> u8 {
        Mixer::next_sample(self)
    }
}
