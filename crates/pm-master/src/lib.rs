//! Headless controller for the pmpc synthesizer.
//!
//! Provides one API for loading scores, real-time playback and offline
//! rendering that the CLI and the tests share.

mod wav;

use pm_audio::{AudioOutput, CpalOutput};
use pm_engine::{Dac, Mixer, SampleSlot, DEFAULT_CAPACITY, INCREMENTS};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

// Re-export common types so callers don't need pm-ir/pm-engine directly.
pub use pm_engine::{EngineError, SAMPLE_RATE};
pub use pm_formats::FormatError;
pub use pm_ir::{Generator, Song, TrackData};

pub use wav::{samples_to_wav, write_wav};

/// How often the playback thread publishes its position, in samples.
const POSITION_INTERVAL: u64 = SAMPLE_RATE as u64 / 100;

#[derive(thiserror::Error, Debug)]
pub enum ControllerError {
    #[error("score error: {0}")]
    Format(#[from] FormatError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Headless synth controller: owns a song and manages playback.
pub struct Controller {
    song: Song,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    position: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// Collects emitted samples for offline rendering.
struct Capture(Vec<u8>);

impl Dac for Capture {
    #[inline]
    fn output(&mut self, sample: u8) {
        self.0.push(sample);
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            song: Song::new("Untitled"),
            playback: None,
        }
    }

    // --- Song management ---

    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Parse a score and make it the current song.
    pub fn load_score(&mut self, text: &str) -> Result<(), ControllerError> {
        let song = pm_formats::load_score(text)?;
        self.load_song(song)
    }

    /// Replace the current song, checking it fits the engine first.
    pub fn load_song(&mut self, song: Song) -> Result<(), ControllerError> {
        Mixer::<DEFAULT_CAPACITY>::from_song(&INCREMENTS, &song)?;
        self.stop();
        log::info!(
            "loaded \"{}\": {} tracks, {} samples per tick, {:.1}s per pass",
            song.title,
            song.track_count(),
            song.samples_per_tick,
            song.duration_samples() as f64 / SAMPLE_RATE as f64
        );
        self.song = song;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) {
        self.song.set_title(title);
    }

    /// Enable or disable looping on every track. Applies from the next
    /// `play` or render.
    pub fn set_looping(&mut self, looping: bool) {
        self.song.set_looping(looping);
    }

    // --- Real-time playback ---

    pub fn play(&mut self) {
        self.stop();

        let song = self.song.clone();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let position = Arc::new(AtomicU64::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let stop = stop_signal.clone();
        let pos = position.clone();
        let done = finished.clone();

        let thread = std::thread::spawn(move || {
            synth_thread(song, stop, pos, done);
        });

        log::info!("playback started");
        self.playback = Some(PlaybackHandle {
            stop_signal,
            position,
            finished,
            thread: Some(thread),
        });
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
            log::info!("playback stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    /// Samples emitted so far, while playing.
    pub fn position(&self) -> Option<u64> {
        let pb = self.playback.as_ref()?;
        if pb.finished.load(Ordering::Relaxed) {
            return None;
        }
        Some(pb.position.load(Ordering::Relaxed))
    }

    // --- Offline rendering ---

    /// Run the song through the interrupt/main-loop pipeline with a
    /// capturing DAC. Stops at `max_samples` or once every track is done.
    pub fn render_samples(&self, max_samples: usize) -> Result<Vec<u8>, ControllerError> {
        let mut mixer = Mixer::<DEFAULT_CAPACITY>::from_song(&INCREMENTS, &self.song)?;
        let slot = SampleSlot::new();
        let mut dac = Capture(Vec::with_capacity(max_samples));

        slot.prime(&mut mixer);
        while dac.0.len() < max_samples && !mixer.is_finished() {
            slot.on_interrupt(&mut dac);
            slot.poll(&mut mixer);
        }

        log::debug!("rendered {} samples", dac.0.len());
        Ok(dac.0)
    }

    /// Render to an 8-bit mono WAV file image.
    pub fn render_to_wav(&self, max_seconds: u32) -> Result<Vec<u8>, ControllerError> {
        let max_samples = SAMPLE_RATE as usize * max_seconds as usize;
        let samples = self.render_samples(max_samples)?;
        Ok(wav::samples_to_wav(&samples, SAMPLE_RATE))
    }

    /// Render and write a WAV file. Returns the number of samples written.
    pub fn export_wav(&self, path: &Path, max_seconds: u32) -> Result<usize, ControllerError> {
        let max_samples = SAMPLE_RATE as usize * max_seconds as usize;
        let samples = self.render_samples(max_samples)?;
        let mut file = BufWriter::new(File::create(path)?);
        wav::write_wav(&mut file, &samples, SAMPLE_RATE)?;
        file.flush()?;
        log::info!("wrote {} samples to {}", samples.len(), path.display());
        Ok(samples.len())
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Stands in for the sampling-rate timer: each pass is one interrupt
/// followed by the main loop picking up the request. The blocking DAC
/// write paces the loop at the device's consumption rate.
fn synth_thread(
    song: Song,
    stop_signal: Arc<AtomicBool>,
    position: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
) {
    let mut mixer = match Mixer::<DEFAULT_CAPACITY>::from_song(&INCREMENTS, &song) {
        Ok(mixer) => mixer,
        Err(e) => {
            log::error!("cannot start playback: {}", e);
            finished.store(true, Ordering::Relaxed);
            return;
        }
    };

    let (mut output, consumer) = match CpalOutput::new() {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("cannot open audio output: {}", e);
            finished.store(true, Ordering::Relaxed);
            return;
        }
    };
    if let Err(e) = output.build_stream(consumer).and_then(|_| output.start()) {
        log::error!("cannot start audio stream: {}", e);
        finished.store(true, Ordering::Relaxed);
        return;
    }

    log::debug!(
        "synthesising at {} Hz for a {} Hz device",
        SAMPLE_RATE,
        output.sample_rate()
    );

    let slot = SampleSlot::new();
    slot.prime(&mut mixer);

    let mut emitted: u64 = 0;
    while !stop_signal.load(Ordering::Relaxed) {
        slot.on_interrupt(&mut output);
        slot.poll(&mut mixer);
        emitted += 1;
        if emitted % POSITION_INTERVAL == 0 {
            position.store(emitted, Ordering::Relaxed);
        }
        if mixer.is_finished() {
            log::info!("all tracks finished after {} samples", emitted);
            break;
        }
    }

    if slot.overruns() > 0 {
        log::warn!("{} sample overruns during playback", slot.overruns());
    }

    output.drain_with_silence();
    if let Err(e) = output.stop() {
        log::warn!("audio stop failed: {}", e);
    }
    finished.store(true, Ordering::Relaxed);
}
