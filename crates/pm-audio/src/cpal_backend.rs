//! CPAL-based audio output backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use pm_engine::{Dac, SAMPLE_RATE, SILENCE};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::hold::{to_f32, ZeroOrderHold};
use crate::traits::{AudioError, AudioOutput};

/// CPAL-based audio output. Samples are queued at the synth rate and
/// stretched to the device rate in the stream callback.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    producer: HeapProd<u8>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Create a new CPAL output with the default device.
    pub fn new() -> Result<(Self, HeapCons<u8>), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;
        let config: StreamConfig = config.into();

        // About 100ms of synth output
        let rb = HeapRb::<u8>::new(SAMPLE_RATE as usize / 10);
        let (producer, consumer) = rb.split();

        log::info!(
            "audio device {} at {} Hz, {} channels",
            device.name().unwrap_or_else(|_| "<unnamed>".into()),
            config.sample_rate.0,
            config.channels
        );

        let output = Self {
            device,
            config,
            stream: None,
            producer,
            running: Arc::new(AtomicBool::new(false)),
        };

        Ok((output, consumer))
    }

    /// Build and start the audio stream.
    pub fn build_stream(&mut self, mut consumer: HeapCons<u8>) -> Result<(), AudioError> {
        let running = self.running.clone();
        let channels = self.config.channels as usize;
        let mut hold = ZeroOrderHold::new(SAMPLE_RATE, self.config.sample_rate.0);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }

                    // Mono source: same value on every channel
                    for chunk in data.chunks_mut(channels) {
                        let value = to_f32(hold.next_frame(|| consumer.try_pop()));
                        chunk.fill(value);
                    }
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }

    /// Write a single sample, spinning until the ring buffer has room.
    ///
    /// The device drains the buffer at the synth rate, so this is what
    /// paces the caller.
    pub fn write_spin(&mut self, sample: u8) {
        while self.producer.try_push(sample).is_err() {
            std::hint::spin_loop();
        }
    }

    /// Queue a second of silence so the tail is not cut off.
    pub fn drain_with_silence(&mut self) {
        let block = [SILENCE; 256];
        let mut left = SAMPLE_RATE as usize;
        while left > 0 {
            let written = self.write(&block[..left.min(block.len())]);
            if written == 0 {
                std::hint::spin_loop();
            }
            left -= written;
        }
    }
}

impl Dac for CpalOutput {
    #[inline]
    fn output(&mut self, sample: u8) {
        self.write_spin(sample);
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn write(&mut self, samples: &[u8]) -> usize {
        // Non-blocking; returns how many fit
        self.producer.push_slice(samples)
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}
