//! Phase-continuous tone oscillator
//!
//! Every FSK-style encoder keys one oscillator per call. The phase is
//! carried from one bit to the next so the carrier never jumps at a
//! symbol boundary, only its frequency changes.

use crate::buffer::PcmBuffer;
use crate::{CoreError, Result};
use std::f64::consts::TAU;

/// Whole samples per bit. Truncates when the baud rate does not divide
/// the sample rate, so long transmissions drift against real time.
pub fn samples_per_bit(sample_rate: u32, baud_rate: u32) -> usize {
    if baud_rate == 0 {
        return 0;
    }
    (sample_rate / baud_rate) as usize
}

/// Running sine oscillator owned by a single encode session
#[derive(Debug, Clone)]
pub struct PhaseOscillator {
    sample_rate: u32,
    amplitude: f64,
    phase: f64,
}

impl PhaseOscillator {
    /// Create an oscillator at phase zero
    pub fn new(sample_rate: u32, amplitude: i16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }

        Ok(Self {
            sample_rate,
            amplitude: amplitude as f64,
            phase: 0.0,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current phase in radians, always in `[0, 2π)`
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase increment per sample at `frequency`
    pub fn phase_step(&self, frequency: f64) -> f64 {
        TAU * frequency / self.sample_rate as f64
    }

    /// Produce one sample and advance the phase
    pub fn next_sample(&mut self, frequency: f64) -> i16 {
        let sample = (self.amplitude * self.phase.sin()).round() as i16;
        self.phase += self.phase_step(frequency);
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        sample
    }

    /// Write `count` samples of `frequency` into `out`
    pub fn emit(&mut self, frequency: f64, count: usize, out: &mut PcmBuffer) -> Result<()> {
        out.extend_with(count, || self.next_sample(frequency))
    }

    /// Return to phase zero
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
