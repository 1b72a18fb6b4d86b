//! DTMF tone generation
//!
//! Each digit is the sum of one low-group and one high-group tone, each at
//! half amplitude, followed by a pause.

use crate::{CodecError, Result};
use rawsignal_core::buffer::PcmBuffer;
use rawsignal_core::oscillator::PhaseOscillator;
use rawsignal_core::{DEFAULT_SAMPLE_RATE, MAX_PCM_VALUE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const LOW_GROUP: [f64; 4] = [697.0, 770.0, 852.0, 941.0];
const HIGH_GROUP: [f64; 4] = [1209.0, 1336.0, 1477.0, 1633.0];

const KEYPAD: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// Low and high tone for a keypad digit, case-insensitive
pub fn dtmf_frequencies(digit: char) -> Option<(f64, f64)> {
    let digit = digit.to_ascii_uppercase();
    KEYPAD.iter().enumerate().find_map(|(row, keys)| {
        keys.iter()
            .position(|&key| key == digit)
            .map(|col| (LOW_GROUP[row], HIGH_GROUP[col]))
    })
}

/// DTMF timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtmfConfig {
    pub tone_ms: u32,
    pub pause_ms: u32,
    pub sample_rate: u32,
}

impl Default for DtmfConfig {
    fn default() -> Self {
        Self {
            tone_ms: 50,
            pause_ms: 50,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl DtmfConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tone_ms == 0 || self.pause_ms == 0 {
            return Err(CodecError::InvalidParameters {
                msg: format!(
                    "tone and pause must be positive, got {} ms / {} ms",
                    self.tone_ms, self.pause_ms
                ),
            });
        }
        if self.sample_rate as f64 / 2.0 <= HIGH_GROUP[3] {
            return Err(CodecError::InvalidParameters {
                msg: format!("sample rate {} too low for DTMF", self.sample_rate),
            });
        }
        Ok(())
    }

    fn ms_to_samples(&self, ms: u32) -> usize {
        (self.sample_rate as u64 * ms as u64 / 1000) as usize
    }

    pub fn tone_samples(&self) -> usize {
        self.ms_to_samples(self.tone_ms)
    }

    pub fn pause_samples(&self) -> usize {
        self.ms_to_samples(self.pause_ms)
    }
}

/// Dual-tone generator for a digit string
pub struct DtmfGenerator {
    config: DtmfConfig,
}

impl DtmfGenerator {
    pub fn new(config: DtmfConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Digits that will actually be sent
    fn tones<'a>(&self, digits: &'a str) -> impl Iterator<Item = (char, (f64, f64))> + 'a {
        digits.chars().filter_map(|digit| match dtmf_frequencies(digit) {
            Some(pair) => Some((digit, pair)),
            None => {
                warn!(digit = ?digit, "Unknown DTMF digit, skipping");
                None
            }
        })
    }

    /// Samples [`DtmfGenerator::generate`] produces for `digits`
    pub fn message_length(&self, digits: &str) -> usize {
        let count = digits
            .chars()
            .filter(|&d| dtmf_frequencies(d).is_some())
            .count();
        count * (self.config.tone_samples() + self.config.pause_samples())
    }

    pub fn generate(&self, digits: &str) -> Result<PcmBuffer> {
        let len = self.message_length(digits);
        if len == 0 {
            return Err(CodecError::EncodingFailed {
                msg: format!("no DTMF digits in {:?}", digits),
            });
        }

        let sample_rate = self.config.sample_rate;
        let mut out = PcmBuffer::with_exact_capacity(len, sample_rate)?;
        let mut low = PhaseOscillator::new(sample_rate, MAX_PCM_VALUE / 2)?;
        let mut high = PhaseOscillator::new(sample_rate, MAX_PCM_VALUE / 2)?;

        for (digit, (f_low, f_high)) in self.tones(digits) {
            debug!(digit = ?digit, f_low, f_high, "DTMF digit");
            low.reset();
            high.reset();
            out.extend_with(self.config.tone_samples(), || {
                low.next_sample(f_low) + high.next_sample(f_high)
            })?;
            out.extend_silence(self.config.pause_samples())?;
        }

        let pcm = out.finish()?;
        info!(samples = pcm.len(), "DTMF sequence encoded");
        Ok(pcm)
    }
}
