//! Static per-track configuration.

use crate::generator::Generator;

/// Everything the engine needs to create a track.
///
/// The note stream is borrowed; the engine never owns or mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackConfig<'a> {
    /// Encoded note stream
    pub stream: &'a [u8],
    /// Waveform generator, fixed for the track's lifetime
    pub generator: Generator,
    /// Start in the playing state
    pub playing: bool,
    /// Rewind instead of stopping at the end of the stream
    pub looping: bool,
}

impl<'a> TrackConfig<'a> {
    /// A playing, looping track (the player's default).
    pub const fn new(stream: &'a [u8], generator: Generator) -> Self {
        Self {
            stream,
            generator,
            playing: true,
            looping: true,
        }
    }

    pub const fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub const fn playing(mut self, playing: bool) -> Self {
        self.playing = playing;
        self
    }
}
