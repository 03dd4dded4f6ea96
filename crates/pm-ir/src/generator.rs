//! Waveform generator kinds.

use core::fmt;
use core::str::FromStr;

/// The closed set of waveform generators a track can be assigned.
///
/// The assignment is fixed when a track is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Generator {
    /// Forward sawtooth ramp.
    #[default]
    Sawtooth,
    /// Symmetric triangle.
    Triangle,
    /// Two-level square, levels matched to the ramps' RMS.
    Square,
    /// LFSR noise with a short (93 sample) cycle.
    Noise93,
    /// LFSR noise with a long (32k sample) cycle.
    Noise32k,
}

impl Generator {
    pub const ALL: [Generator; 5] = [
        Generator::Sawtooth,
        Generator::Triangle,
        Generator::Square,
        Generator::Noise93,
        Generator::Noise32k,
    ];

    /// Short name as used in score headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Generator::Sawtooth => "saw",
            Generator::Triangle => "tri",
            Generator::Square => "sq",
            Generator::Noise93 => "noise93",
            Generator::Noise32k => "noise32k",
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Returned when a generator name is not one of the five known kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseGeneratorError;

impl fmt::Display for ParseGeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown generator (expected saw, tri, sq, noise93 or noise32k)")
    }
}

impl FromStr for Generator {
    type Err = ParseGeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Generator::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or(ParseGeneratorError)
    }
}
