//! Plain-text score parser.
//!
//! ```text
//! # comment
//! > samps_per_tick: 230
//! > generators: sq, tri
//! > ticks_per_whole: 96
//! > cut_ticks: 2
//!
//! e3=4 g3=4 c4=2+
//! c2=1
//!
//! d4-48 /=2
//! g1=1
//! ```
//!
//! Line *k* of every blank-line separated block belongs to track *k*.
//! Tokens are `<pitch|/><-|=><length>[+]`: `-N` is N ticks, `=N` is a
//! 1/N note, `=N.` dotted, `=N,M` an N-tuplet split M ways. A trailing `+`
//! shortens the event by `cut_ticks` and follows it with a rest that long.

use pm_engine::attenuation_for;
use pm_ir::{Generator, NoteEvent, Song, TrackData, MAX_REST_TICKS, NOTE_COUNT};

use crate::FormatError;

/// Header values shared by every track.
#[derive(Clone, Debug, Default)]
struct Header {
    samples_per_tick: Option<u16>,
    generators: Option<Vec<Generator>>,
    ticks_per_whole: Option<u32>,
    cut_ticks: Option<u8>,
}

/// Length part of a token, before `ticks_per_whole` is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    /// `-N`
    Ticks(u32),
    /// `=N`
    Fraction(u32),
    /// `=N.`
    Dotted(u32),
    /// `=N,M`
    Tuplet(u32, u32),
}

impl Length {
    /// Resolve to ticks, truncating. `None` on a zero divisor.
    pub fn ticks(self, ticks_per_whole: u32) -> Option<u32> {
        match self {
            Length::Ticks(n) => Some(n),
            Length::Fraction(n) => ticks_per_whole.checked_div(n),
            Length::Dotted(n) => ticks_per_whole.checked_mul(3)?.checked_div(n.checked_mul(2)?),
            Length::Tuplet(n, m) => ticks_per_whole.checked_div(n.checked_mul(m)?),
        }
    }
}

/// Parse a pitch name such as `c0`, `F3` (f sharp) or `b5`.
///
/// Lowercase letters are naturals, uppercase the sharp above. Returns the
/// semitone index, which may exceed the table for `B5`.
pub fn parse_pitch(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let semitone = match chars.next()? {
        'c' => 0,
        'C' => 1,
        'd' => 2,
        'D' => 3,
        'e' => 4,
        'E' | 'f' => 5,
        'F' => 6,
        'g' => 7,
        'G' => 8,
        'a' => 9,
        'A' => 10,
        'b' => 11,
        'B' => 12,
        _ => return None,
    };
    let octave = chars.next()?.to_digit(10).filter(|&o| o <= 5)? as u8;
    if chars.next().is_some() {
        return None;
    }
    Some(semitone + 12 * octave)
}

/// Parse the length part of a token (after `-` or `=`, without `+`).
pub fn parse_length(kind: char, text: &str) -> Option<Length> {
    let number = |s: &str| -> Option<u32> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };
    match kind {
        '-' => number(text).map(Length::Ticks),
        '=' => {
            if let Some(base) = text.strip_suffix('.') {
                number(base).map(Length::Dotted)
            } else if let Some((n, m)) = text.split_once(',') {
                Some(Length::Tuplet(number(n)?, number(m)?))
            } else {
                number(text).map(Length::Fraction)
            }
        }
        _ => None,
    }
}

/// Parse a score into a song. Every track starts playing and loops.
pub fn load_score(text: &str) -> Result<Song, FormatError> {
    let mut header = Header::default();
    let mut body: Vec<(usize, &str)> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.starts_with('#') {
            continue;
        }
        if let Some(entry) = trimmed.strip_prefix('>') {
            parse_header_line(&mut header, line, entry)?;
            continue;
        }
        body.push((line, trimmed));
    }

    let samples_per_tick = header
        .samples_per_tick
        .ok_or(FormatError::MissingMetadata("samps_per_tick"))?;
    let generators = header
        .generators
        .ok_or(FormatError::MissingMetadata("generators"))?;
    let ticks_per_whole = header
        .ticks_per_whole
        .ok_or(FormatError::MissingMetadata("ticks_per_whole"))?;
    let cut_ticks = header
        .cut_ticks
        .ok_or(FormatError::MissingMetadata("cut_ticks"))?;

    let lines = join_blocks(&body)?;
    if generators.len() != lines.len() {
        return Err(FormatError::GeneratorCount {
            generators: generators.len(),
            tracks: lines.len(),
        });
    }

    let mut song = Song::new("");
    song.samples_per_tick = samples_per_tick;
    song.attenuation = attenuation_for(lines.len());
    for (track_lines, generator) in lines.iter().zip(generators) {
        let mut data = Vec::new();
        for &(line, content) in track_lines {
            for token in content.split_whitespace() {
                encode_token(&mut data, line, token, ticks_per_whole, cut_ticks)?;
            }
        }
        song.tracks.push(TrackData::new(data, generator));
    }

    log::debug!(
        "score: {} tracks, {} samples per tick, attenuation {}",
        song.track_count(),
        song.samples_per_tick,
        song.attenuation
    );
    Ok(song)
}

fn parse_header_line(header: &mut Header, line: usize, entry: &str) -> Result<(), FormatError> {
    let (key, value) = entry
        .split_once(':')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .ok_or_else(|| FormatError::InvalidHeader {
            line,
            text: entry.to_string(),
        })?;

    match key {
        "samps_per_tick" => {
            let spt = parse_value::<u16>(line, "samps_per_tick", value)?;
            if spt == 0 {
                return Err(invalid_value(line, "samps_per_tick", value));
            }
            header.samples_per_tick = Some(spt);
        }
        "generators" => {
            let generators = value
                .split(',')
                .map(str::trim)
                .map(|name| {
                    name.parse::<Generator>().map_err(|_| FormatError::UnknownGenerator {
                        line,
                        name: name.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            header.generators = Some(generators);
        }
        "ticks_per_whole" => {
            header.ticks_per_whole = Some(parse_value(line, "ticks_per_whole", value)?);
        }
        "cut_ticks" => {
            let cut = parse_value::<u8>(line, "cut_ticks", value)?;
            if cut > MAX_REST_TICKS {
                return Err(invalid_value(line, "cut_ticks", value));
            }
            header.cut_ticks = Some(cut);
        }
        _ => {
            return Err(FormatError::UnknownKey {
                line,
                key: key.to_string(),
            })
        }
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(line: usize, key: &'static str, value: &str) -> Result<T, FormatError> {
    value.parse().map_err(|_| invalid_value(line, key, value))
}

fn invalid_value(line: usize, key: &'static str, value: &str) -> FormatError {
    FormatError::InvalidValue {
        line,
        key,
        value: value.to_string(),
    }
}

/// Group body lines into per-track line lists.
fn join_blocks<'a>(body: &[(usize, &'a str)]) -> Result<Vec<Vec<(usize, &'a str)>>, FormatError> {
    let mut tracks: Vec<Vec<(usize, &str)>> = Vec::new();
    let mut first_block = true;
    let mut row = 0;

    for &(line, content) in body {
        if content.is_empty() {
            if row > 0 {
                first_block = false;
            }
            row = 0;
            continue;
        }
        if first_block {
            tracks.push(vec![(line, content)]);
        } else {
            let track = tracks.get_mut(row).ok_or(FormatError::BlockShape {
                line,
                expected: row,
                found: row + 1,
            })?;
            track.push((line, content));
        }
        row += 1;
    }

    if tracks.is_empty() {
        return Err(FormatError::NoTracks);
    }
    Ok(tracks)
}

/// Append the bytes for one token.
fn encode_token(
    data: &mut Vec<u8>,
    line: usize,
    token: &str,
    ticks_per_whole: u32,
    cut_ticks: u8,
) -> Result<(), FormatError> {
    let invalid = || FormatError::InvalidToken {
        line,
        token: token.to_string(),
    };

    let (pitch, rest) = if let Some(rest) = token.strip_prefix('/') {
        (None, rest)
    } else {
        let name = token.get(..2).ok_or_else(invalid)?;
        let pitch = parse_pitch(name).ok_or_else(invalid)?;
        (Some(pitch), &token[2..])
    };

    let mut chars = rest.chars();
    let kind = chars.next().filter(|&c| matches!(c, '-' | '=')).ok_or_else(invalid)?;
    let length_text = chars.as_str();
    let (length_text, cut) = match length_text.strip_suffix('+') {
        Some(stripped) => (stripped, true),
        None => (length_text, false),
    };
    if length_text.is_empty() {
        return Err(invalid());
    }

    let ticks = parse_length(kind, length_text)
        .and_then(|l| l.ticks(ticks_per_whole))
        .ok_or_else(|| FormatError::InvalidDuration {
            line,
            token: token.to_string(),
        })?;
    let shortened_by = if cut { cut_ticks as i64 } else { 0 };
    let length = ticks as i64 - shortened_by;

    let out_of_range = || FormatError::LengthOutOfRange {
        line,
        token: token.to_string(),
        length,
    };
    let event = match pitch {
        None => {
            if !(0..=MAX_REST_TICKS as i64).contains(&length) {
                return Err(out_of_range());
            }
            NoteEvent::Rest { ticks: length as u8 }
        }
        Some(pitch) => {
            if pitch as usize >= NOTE_COUNT {
                return Err(FormatError::PitchOutOfRange {
                    line,
                    token: token.to_string(),
                    pitch,
                });
            }
            if !(0..=u8::MAX as i64).contains(&length) {
                return Err(out_of_range());
            }
            NoteEvent::Note { pitch, ticks: length as u8 }
        }
    };
    if event.ticks() == 0 {
        return Err(FormatError::ZeroLength {
            line,
            token: token.to_string(),
        });
    }

    data.extend(event.encode());
    if cut && cut_ticks > 0 {
        data.extend(NoteEvent::Rest { ticks: cut_ticks }.encode());
    }
    Ok(())
}
