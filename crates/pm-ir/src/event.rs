//! Note stream encoding.
//!
//! A track's note stream is a flat byte sequence. Each event is either a
//! note (`[pitch, ticks]`, pitch in `0..NOTE_COUNT`) or a rest
//! (`[REST_FLAG | ticks]`, a single byte).

use arrayvec::ArrayVec;

/// Number of addressable pitches (semitones) in the frequency table.
pub const NOTE_COUNT: usize = 72;

/// High bit marking a rest byte.
pub const REST_FLAG: u8 = 0x80;

/// Longest rest a single byte can encode.
pub const MAX_REST_TICKS: u8 = 0x7f;

/// At most two bytes per event.
pub type EncodedEvent = ArrayVec<u8, 2>;

/// One decoded note stream event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEvent {
    /// Play `pitch` for `ticks` ticks.
    Note { pitch: u8, ticks: u8 },
    /// Stay silent for `ticks` ticks.
    Rest { ticks: u8 },
}

impl NoteEvent {
    /// Decode the event starting at `pos`.
    ///
    /// Returns the event and the number of bytes it occupies, or `None` if
    /// `pos` is at the end of the stream or a note is missing its tick byte.
    #[inline]
    pub fn decode(stream: &[u8], pos: usize) -> Option<(NoteEvent, usize)> {
        let head = *stream.get(pos)?;
        if head & REST_FLAG != 0 {
            return Some((NoteEvent::Rest { ticks: head & MAX_REST_TICKS }, 1));
        }
        let ticks = *stream.get(pos + 1)?;
        Some((NoteEvent::Note { pitch: head, ticks }, 2))
    }

    /// Encode the event as stream bytes.
    ///
    /// Rest tick counts above `MAX_REST_TICKS` are truncated to 7 bits;
    /// callers validate lengths before encoding.
    pub fn encode(&self) -> EncodedEvent {
        let mut out = EncodedEvent::new();
        match *self {
            NoteEvent::Note { pitch, ticks } => {
                out.push(pitch);
                out.push(ticks);
            }
            NoteEvent::Rest { ticks } => out.push(REST_FLAG | (ticks & MAX_REST_TICKS)),
        }
        out
    }

    /// Duration of the event in ticks.
    pub fn ticks(&self) -> u8 {
        match *self {
            NoteEvent::Note { ticks, .. } | NoteEvent::Rest { ticks } => ticks,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, NoteEvent::Rest { .. })
    }
}

/// Iterator over the events of a note stream.
#[derive(Clone, Debug)]
pub struct Events<'a> {
    stream: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Events<'a> {
    type Item = NoteEvent;

    fn next(&mut self) -> Option<NoteEvent> {
        let (event, len) = NoteEvent::decode(self.stream, self.pos)?;
        self.pos += len;
        Some(event)
    }
}

/// Iterate over the events of `stream`.
pub fn events(stream: &[u8]) -> Events<'_> {
    Events { stream, pos: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_note_consumes_two_bytes() {
        let stream = [60, 10, 0x85];
        assert_eq!(
            NoteEvent::decode(&stream, 0),
            Some((NoteEvent::Note { pitch: 60, ticks: 10 }, 2))
        );
    }

    #[test]
    fn decode_rest_consumes_one_byte() {
        let stream = [60, 10, 0x85];
        assert_eq!(NoteEvent::decode(&stream, 2), Some((NoteEvent::Rest { ticks: 5 }, 1)));
    }

    #[test]
    fn decode_at_end_is_none() {
        assert_eq!(NoteEvent::decode(&[0x81], 1), None);
    }

    #[test]
    fn decode_truncated_note_is_none() {
        assert_eq!(NoteEvent::decode(&[12], 0), None);
    }

    #[test]
    fn zero_tick_rest() {
        assert_eq!(NoteEvent::decode(&[0x80], 0), Some((NoteEvent::Rest { ticks: 0 }, 1)));
    }

    #[test]
    fn encode_matches_stream_layout() {
        assert_eq!(NoteEvent::Note { pitch: 71, ticks: 255 }.encode().as_slice(), &[71, 255]);
        assert_eq!(NoteEvent::Rest { ticks: 127 }.encode().as_slice(), &[0xff]);
    }

    #[test]
    fn events_walks_whole_stream() {
        let stream = [0, 4, 0x82, 71, 1];
        let all: alloc::vec::Vec<_> = events(&stream).collect();
        assert_eq!(
            all,
            [
                NoteEvent::Note { pitch: 0, ticks: 4 },
                NoteEvent::Rest { ticks: 2 },
                NoteEvent::Note { pitch: 71, ticks: 1 },
            ]
        );
        let total: u32 = all.iter().map(|e| e.ticks() as u32).sum();
        assert_eq!(total, 7);
    }
}
