//! Zero-order-hold rate conversion from the synth rate to the device rate.

use pm_engine::SILENCE;

/// Convert an unsigned 8-bit sample to a float in `[-1.0, 1.0)`.
#[inline]
pub fn to_f32(sample: u8) -> f32 {
    (sample as f32 - SILENCE as f32) / 128.0
}

/// Repeats (or drops) source samples so a `source_rate` stream plays at
/// the right pitch on a `device_rate` device.
#[derive(Clone, Debug)]
pub struct ZeroOrderHold {
    source_rate: u32,
    device_rate: u32,
    acc: u32,
    current: u8,
}

impl ZeroOrderHold {
    pub fn new(source_rate: u32, device_rate: u32) -> Self {
        let device_rate = device_rate.max(1);
        Self {
            source_rate,
            device_rate,
            // First device frame pulls the first source sample.
            acc: device_rate.saturating_sub(source_rate),
            current: SILENCE,
        }
    }

    /// Produce one device frame, pulling from `pull` whenever the held
    /// sample has run its course. An empty source yields silence.
    #[inline]
    pub fn next_frame(&mut self, mut pull: impl FnMut() -> Option<u8>) -> u8 {
        self.acc += self.source_rate;
        while self.acc >= self.device_rate {
            self.acc -= self.device_rate;
            self.current = pull().unwrap_or(SILENCE);
        }
        self.current
    }
}
