//! Common modulation traits and utilities

use crate::{ModemError, Result};
use rawsignal_core::buffer::PcmBuffer;
use rawsignal_core::oscillator::{samples_per_bit, PhaseOscillator};
use rawsignal_frame::hdlc::NrziEncoder;
use serde::{Deserialize, Serialize};

/// Generic modulator trait
pub trait Modulator {
    /// Exact number of samples [`Modulator::modulate`] produces for
    /// `bit_count` bits
    fn pcm_length(&self, bit_count: usize) -> usize;

    /// Modulate logical bits into a new buffer sized by
    /// [`Modulator::pcm_length`]
    fn modulate(&mut self, bits: &[bool]) -> Result<PcmBuffer>;

    /// Get samples per symbol
    fn samples_per_symbol(&self) -> usize;

    /// Get symbol rate
    fn symbol_rate(&self) -> u32;

    /// Reset modulator state
    fn reset(&mut self);
}

/// Chooses the tone for each logical bit
pub trait ToneKeyer {
    /// Frequency in Hz to send for `bit`
    fn frequency(&mut self, bit: bool) -> f64;

    /// Return to the initial line state
    fn reset(&mut self);
}

/// Mark and space tone pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TonePair {
    pub mark: f64,
    pub space: f64,
}

impl TonePair {
    pub fn new(mark: f64, space: f64) -> Self {
        Self { mark, space }
    }

    pub fn select(&self, mark: bool) -> f64 {
        if mark {
            self.mark
        } else {
            self.space
        }
    }

    /// Both tones must be positive and below Nyquist
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        let nyquist = sample_rate as f64 / 2.0;
        for (name, freq) in [("mark", self.mark), ("space", self.space)] {
            if !(freq > 0.0 && freq < nyquist) {
                return Err(ModemError::InvalidParameters {
                    msg: format!(
                        "{} frequency {} Hz outside (0, {}) at {} Hz",
                        name, freq, nyquist, sample_rate
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Plain FSK: 1 sends mark, 0 sends space
#[derive(Debug, Clone)]
pub struct FskKeyer {
    tones: TonePair,
}

impl FskKeyer {
    pub fn new(tones: TonePair) -> Self {
        Self { tones }
    }
}

impl ToneKeyer for FskKeyer {
    fn frequency(&mut self, bit: bool) -> f64 {
        self.tones.select(bit)
    }

    fn reset(&mut self) {}
}

/// NRZI keying: the line level, not the bit, picks the tone
#[derive(Debug, Clone)]
pub struct NrziKeyer {
    tones: TonePair,
    line: NrziEncoder,
}

impl NrziKeyer {
    pub fn new(tones: TonePair) -> Self {
        Self {
            tones,
            line: NrziEncoder::new(),
        }
    }

    pub fn is_mark(&self) -> bool {
        self.line.is_mark()
    }
}

impl ToneKeyer for NrziKeyer {
    fn frequency(&mut self, bit: bool) -> f64 {
        let mark = self.line.encode_bit(bit);
        self.tones.select(mark)
    }

    fn reset(&mut self) {
        self.line.reset();
    }
}

/// Common modulation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulationConfig {
    pub sample_rate: u32,
    pub baud_rate: u32,
}

impl ModulationConfig {
    /// Create a new modulation configuration
    pub fn new(sample_rate: u32, baud_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid sample rate: {}", sample_rate),
            });
        }

        if baud_rate == 0 || baud_rate > sample_rate / 2 {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid baud rate {} at {} Hz", baud_rate, sample_rate),
            });
        }

        Ok(Self {
            sample_rate,
            baud_rate,
        })
    }

    /// Whole samples per bit
    pub fn samples_per_symbol(&self) -> usize {
        samples_per_bit(self.sample_rate, self.baud_rate)
    }
}

/// Key every bit onto the oscillator for `samples_per_bit` samples.
///
/// The oscillator phase runs on across bit boundaries.
pub fn key_bits<K: ToneKeyer>(
    oscillator: &mut PhaseOscillator,
    keyer: &mut K,
    bits: impl IntoIterator<Item = bool>,
    samples_per_bit: usize,
    out: &mut PcmBuffer,
) -> Result<()> {
    for bit in bits {
        let frequency = keyer.frequency(bit);
        oscillator.emit(frequency, samples_per_bit, out)?;
    }
    Ok(())
}

/// Bytes as bits, least significant first
pub fn lsb_first_bits(data: &[u8]) -> impl Iterator<Item = bool> + '_ {
    data.iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> i) & 1 != 0))
}
