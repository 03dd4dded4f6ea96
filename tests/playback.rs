//! Integration test: score or song → controller → pipeline render → verify output.

use pm_engine::{Mixer, DEFAULT_CAPACITY, INCREMENTS, SILENCE, SQUARE_HIGH, SQUARE_LOW};
use pm_master::{Controller, Generator, Song, TrackData, SAMPLE_RATE};
use std::fs;
use std::path::PathBuf;

const SPT: u16 = 4;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/score")
}

fn load_fixture(name: &str) -> Controller {
    let text = fs::read_to_string(fixtures_dir().join(name)).unwrap();
    let mut ctrl = Controller::new();
    ctrl.load_score(&text).unwrap();
    ctrl
}

/// One sawtooth track: note 60 for 10 ticks, then a 5-tick rest.
fn note_then_rest(looping: bool) -> Song {
    let mut song = Song::new("note then rest");
    song.samples_per_tick = SPT;
    let mut track = TrackData::new(vec![60, 10, 0x85], Generator::Sawtooth);
    track.looping = looping;
    song.tracks.push(track);
    song
}

fn saw(n: usize) -> u8 {
    ((n as u16).wrapping_mul(INCREMENTS[60]) >> 8) as u8
}

fn controller_with(song: Song) -> Controller {
    let mut ctrl = Controller::new();
    ctrl.load_song(song).unwrap();
    ctrl
}

// --- single track ---

#[test]
fn note_then_rest_renders_tone_then_silence() {
    let ctrl = controller_with(note_then_rest(false));
    let samples = ctrl.render_samples(10_000).unwrap();

    let note_len = 10 * SPT as usize;
    let rest_len = 5 * SPT as usize;
    assert_eq!(samples.len(), note_len + rest_len);
    for (n, &s) in samples[..note_len].iter().enumerate() {
        assert_eq!(s, saw(n), "sample {}", n);
    }
    assert!(samples[note_len..].iter().all(|&s| s == SILENCE));
}

#[test]
fn one_shot_track_stays_silent_after_the_end() {
    let song = note_then_rest(false);
    let mut mixer = Mixer::<DEFAULT_CAPACITY>::from_song(&INCREMENTS, &song).unwrap();
    for _ in 0..15 * SPT as usize {
        mixer.next_sample();
    }
    assert!(!mixer.is_finished());
    for _ in 0..10_000 {
        assert_eq!(mixer.next_sample(), SILENCE);
    }
    assert!(mixer.is_finished());
}

#[test]
fn looping_track_repeats_after_one_silent_sample() {
    let ctrl = controller_with(note_then_rest(true));
    let samples = ctrl.render_samples(500).unwrap();
    assert_eq!(samples.len(), 500);

    // Note, rest, then the rewind sample.
    let period = 15 * SPT as usize + 1;
    assert_eq!(samples[period - 1], SILENCE);
    for n in period..samples.len() {
        assert_eq!(samples[n], samples[n - period], "sample {}", n);
    }
    assert_eq!(samples[period], 0);
}

// --- mixing ---

#[test]
fn rest_plus_square_mixes_to_two_levels() {
    let mut song = Song::new("two levels");
    song.samples_per_tick = 10;
    song.attenuation = 1;
    song.tracks.push(TrackData::new(vec![0xff], Generator::Sawtooth));
    song.tracks.push(TrackData::new(vec![71, 255], Generator::Square));

    let ctrl = controller_with(song);
    let samples = ctrl.render_samples(2550).unwrap();

    let high = 128 + ((SQUARE_HIGH as i16 - 128) >> 1);
    let low = 128 + ((SQUARE_LOW as i16 - 128) >> 1);
    assert_eq!(high, 151);
    assert_eq!(low, 105);
    assert!(samples.iter().all(|&s| s as i16 == high || s as i16 == low));
    assert!(samples.contains(&151));
    assert!(samples.contains(&105));
}

#[test]
fn silent_song_renders_silence() {
    let mut song = Song::new("rests");
    song.samples_per_tick = 3;
    song.attenuation = 1;
    song.tracks.push(TrackData::new(vec![0x8a], Generator::Triangle));
    song.tracks.push(TrackData::new(vec![0x85, 0x85], Generator::Noise32k));

    let ctrl = controller_with(song);
    let samples = ctrl.render_samples(1000).unwrap();
    assert!(samples.iter().all(|&s| s == SILENCE));
}

// --- fixtures ---

#[test]
fn canon_renders_nonsilent() {
    let ctrl = load_fixture("canon.pmpc");
    let samples = ctrl.render_samples(SAMPLE_RATE as usize).unwrap();
    assert_eq!(samples.len(), SAMPLE_RATE as usize);
    assert!(samples.iter().any(|&s| s != SILENCE));
}

#[test]
fn canon_one_shot_ends_after_two_bars() {
    let mut ctrl = load_fixture("canon.pmpc");
    ctrl.set_looping(false);
    let samples = ctrl.render_samples(SAMPLE_RATE as usize * 10).unwrap();
    assert_eq!(samples.len() as u64, ctrl.song().duration_samples());
}

#[test]
fn canon_wav_header_and_length() {
    let ctrl = load_fixture("canon.pmpc");
    let wav = ctrl.render_to_wav(2).unwrap();
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(wav.len(), 44 + 2 * SAMPLE_RATE as usize);
}
