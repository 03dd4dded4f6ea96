//! Format support for pmpc.
//!
//! Parses plain-text scores into a [`Song`](pm_ir::Song) and builds phase
//! increment tables for arbitrary sampling rates.

mod increments;
mod score;

pub use increments::{build_increment_table, DEFAULT_ROOT_HZ, SEMITONE_RATIO};
pub use score::{load_score, parse_length, parse_pitch, Length};

/// Error type for score parsing and table building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A `>` line that is not `key: value`
    #[error("line {line}: malformed header `{text}`")]
    InvalidHeader { line: usize, text: String },
    /// Header key not understood
    #[error("line {line}: unknown key `{key}`")]
    UnknownKey { line: usize, key: String },
    /// Header value that does not parse or is out of range
    #[error("line {line}: invalid value `{value}` for `{key}`")]
    InvalidValue { line: usize, key: &'static str, value: String },
    /// Generator name not one of saw, tri, sq, noise93, noise32k
    #[error("line {line}: unknown generator `{name}`")]
    UnknownGenerator { line: usize, name: String },
    /// A required header key is absent
    #[error("missing metadata `{0}`")]
    MissingMetadata(&'static str),
    /// No note lines at all
    #[error("score has no tracks")]
    NoTracks,
    /// A block with more lines than the first block
    #[error("line {line}: block has {found} lines but the score has {expected} tracks")]
    BlockShape { line: usize, expected: usize, found: usize },
    /// Header lists a different number of generators than there are tracks
    #[error("{generators} generators for {tracks} tracks")]
    GeneratorCount { generators: usize, tracks: usize },
    /// Token is not `<pitch|/><-|=><length>[+]`
    #[error("line {line}: invalid token `{token}`")]
    InvalidToken { line: usize, token: String },
    /// Length part of a token does not parse
    #[error("line {line}: invalid duration in `{token}`")]
    InvalidDuration { line: usize, token: String },
    /// Length does not fit the event encoding
    #[error("line {line}: length {length} out of range for `{token}`")]
    LengthOutOfRange { line: usize, token: String, length: i64 },
    /// Pitch index beyond the increment table
    #[error("line {line}: pitch {pitch} out of range in `{token}`")]
    PitchOutOfRange { line: usize, token: String, pitch: u8 },
    /// Event that would last zero ticks
    #[error("line {line}: zero-length event `{token}`")]
    ZeroLength { line: usize, token: String },
    /// Sampling rate or root frequency not positive
    #[error("invalid increment table input: sample rate {sample_rate}, root {root_hz} Hz")]
    InvalidTableInput { sample_rate: u32, root_hz: String },
    /// Increment that rounds to zero or exceeds 16 bits
    #[error("increment {increment} for note {note} does not fit 1..=65535")]
    IncrementOutOfRange { note: usize, increment: u64 },
}
