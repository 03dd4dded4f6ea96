//! Configuration errors.

use core::fmt;

/// Raised while configuring a [`Mixer`](crate::Mixer), never while rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The mixer's fixed track capacity is exhausted
    TooManyTracks { capacity: usize },
    /// `tracks` shifted offsets could sum outside a byte, or the exponent is above 7
    Attenuation { tracks: usize, exponent: u8 },
    /// Every event would last zero samples
    ZeroSamplesPerTick,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::TooManyTracks { capacity } => {
                write!(f, "Too many tracks (capacity {})", capacity)
            }
            EngineError::Attenuation { tracks, exponent } => write!(
                f,
                "Attenuation exponent {} cannot mix {} tracks without overflow",
                exponent, tracks
            ),
            EngineError::ZeroSamplesPerTick => write!(f, "Samples per tick must be non-zero"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}
