//! Single-slot handoff between the sampling-rate interrupt and the main loop.
//!
//! The interrupt side calls [`SampleSlot::on_interrupt`] once per sampling
//! period: it writes the held sample to the DAC and raises the "compute next"
//! flag. The main loop calls [`SampleSlot::poll`] repeatedly; when the flag
//! is up it claims it, mixes the next sample and publishes it.
//!
//! The held sample and its "fresh" mark share one atomic cell, so the
//! interrupt reads both and clears the mark in a single step.
//!
//! Ordering contract:
//! - producer: claim flag (Acquire) → compute → store sample with fresh
//!   mark (Release).
//! - consumer: take sample and clear mark (Acquire) → output → raise flag
//!   (Release).
//!
//! If the producer has not published by the next interrupt, the previous
//! sample is emitted again and counted in [`SampleSlot::overruns`].

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

use crate::generator::SILENCE;

/// Set in the cell while the held sample has not been emitted yet.
const FRESH: u16 = 0x100;

/// Output device accepting one unsigned 8-bit sample per sampling period.
pub trait Dac {
    fn output(&mut self, sample: u8);
}

/// Anything that can produce the next output sample.
pub trait SampleSource {
    fn next_sample(&mut self) -> u8;
}

/// The held sample and its "compute next" flag.
#[derive(Debug)]
pub struct SampleSlot {
    /// Low byte: sample. `FRESH`: not emitted yet.
    cell: AtomicU16,
    ready: AtomicBool,
    overruns: AtomicU32,
}

impl SampleSlot {
    /// An empty slot holding silence. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            cell: AtomicU16::new(SILENCE as u16),
            ready: AtomicBool::new(false),
            overruns: AtomicU32::new(0),
        }
    }

    /// Compute the first sample before the timer starts firing.
    pub fn prime<S: SampleSource + ?Sized>(&self, source: &mut S) {
        self.ready.store(false, Ordering::Relaxed);
        self.publish(source.next_sample());
    }

    /// Interrupt entry point: emit the held sample and request the next one.
    ///
    /// An interrupt that finds no newly published sample re-emits the old
    /// one and counts an overrun.
    #[inline]
    pub fn on_interrupt<D: Dac + ?Sized>(&self, dac: &mut D) {
        let cell = self.cell.fetch_and(!FRESH, Ordering::Acquire);
        dac.output(cell as u8);
        if cell & FRESH == 0 {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        }
        self.ready.store(true, Ordering::Release);
    }

    /// Main-loop entry point. Returns `true` if a sample was computed.
    #[inline]
    pub fn poll<S: SampleSource + ?Sized>(&self, source: &mut S) -> bool {
        if !self.ready.swap(false, Ordering::Acquire) {
            return false;
        }

        #[cfg(feature = "alloc_check")]
        let next = assert_no_alloc::assert_no_alloc(|| source.next_sample());
        #[cfg(not(feature = "alloc_check"))]
        let next = source.next_sample();

        self.publish(next);
        true
    }

    #[inline]
    fn publish(&self, sample: u8) {
        self.cell.store(sample as u16 | FRESH, Ordering::Release);
    }

    /// The sample the next interrupt will emit.
    pub fn held(&self) -> u8 {
        self.cell.load(Ordering::Acquire) as u8
    }

    /// Is a "compute next" request pending?
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Interrupts that re-emitted a sample because nothing new was published.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl Default for SampleSlot {
    fn default() -> Self {
        Self::new()
    }
}
