//! Frequency Shift Keying (FSK) implementation
//!
//! Plain binary FSK without framing: message bytes go out LSB first, a 1
//! on the mark tone and a 0 on the space tone. Some presets lead with an
//! alternating bit preamble for receiver clock recovery.

use crate::common::{
    key_bits, lsb_first_bits, FskKeyer, ModulationConfig, Modulator, ToneKeyer, TonePair,
};
use crate::{ModemError, Result};
use rawsignal_core::buffer::PcmBuffer;
use rawsignal_core::oscillator::PhaseOscillator;
use rawsignal_core::MAX_PCM_VALUE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// FSK configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FskConfig {
    pub mark_frequency: f64,
    pub space_frequency: f64,
    pub baud_rate: u32,
    /// Alternating 0,1,0,1... bits sent before the message
    pub preamble_bits: usize,
}

impl FskConfig {
    /// 9600 baud, 4800/8400 Hz, no preamble
    pub fn fsk9600() -> Self {
        Self {
            mark_frequency: 4800.0,
            space_frequency: 8400.0,
            baud_rate: 9600,
            preamble_bits: 0,
        }
    }

    /// 1200 baud, 1200/2200 Hz, 20 bit preamble
    pub fn ufsk1200() -> Self {
        Self {
            mark_frequency: 1200.0,
            space_frequency: 2200.0,
            baud_rate: 1200,
            preamble_bits: 20,
        }
    }

    pub fn tones(&self) -> TonePair {
        TonePair::new(self.mark_frequency, self.space_frequency)
    }
}

/// FSK modulator
pub struct FskModulator {
    config: ModulationConfig,
    preamble_bits: usize,
    oscillator: PhaseOscillator,
    keyer: FskKeyer,
}

impl FskModulator {
    /// Create a new FSK modulator
    pub fn new(fsk_config: FskConfig, sample_rate: u32) -> Result<Self> {
        let config = ModulationConfig::new(sample_rate, fsk_config.baud_rate)?;
        let tones = fsk_config.tones();
        tones.validate(sample_rate)?;

        Ok(Self {
            config,
            preamble_bits: fsk_config.preamble_bits,
            oscillator: PhaseOscillator::new(sample_rate, MAX_PCM_VALUE)?,
            keyer: FskKeyer::new(tones),
        })
    }

    /// Bits sent for a message of `len` bytes, preamble included
    pub fn message_bit_count(&self, len: usize) -> usize {
        self.preamble_bits + len * 8
    }

    /// Samples produced by [`FskModulator::encode`] for `len` bytes
    pub fn message_pcm_length(&self, len: usize) -> usize {
        self.pcm_length(self.message_bit_count(len))
    }

    /// Send the preamble followed by `message`.
    ///
    /// An empty message is refused.
    pub fn encode(&mut self, message: &[u8]) -> Result<PcmBuffer> {
        if message.is_empty() {
            return Err(ModemError::InvalidParameters {
                msg: "FSK message is empty".to_string(),
            });
        }

        let preamble = (0..self.preamble_bits).map(|i| i % 2 == 1);
        let bits = preamble.chain(lsb_first_bits(message));
        let pcm = self.render(bits, self.message_bit_count(message.len()))?;

        info!(
            baud = self.config.baud_rate,
            bytes = message.len(),
            samples = pcm.len(),
            "FSK message encoded"
        );
        Ok(pcm)
    }

    fn render(&mut self, bits: impl IntoIterator<Item = bool>, bit_count: usize) -> Result<PcmBuffer> {
        self.reset();

        let len = self.pcm_length(bit_count);
        let mut out = PcmBuffer::with_exact_capacity(len, self.config.sample_rate)?;
        let samples_per_bit = self.samples_per_symbol();
        key_bits(
            &mut self.oscillator,
            &mut self.keyer,
            bits,
            samples_per_bit,
            &mut out,
        )?;

        debug!(bits = bit_count, samples = len, "FSK modulated");
        Ok(out.finish()?)
    }
}

impl Modulator for FskModulator {
    fn pcm_length(&self, bit_count: usize) -> usize {
        bit_count * self.samples_per_symbol()
    }

    fn modulate(&mut self, bits: &[bool]) -> Result<PcmBuffer> {
        self.render(bits.iter().copied(), bits.len())
    }

    fn samples_per_symbol(&self) -> usize {
        self.config.samples_per_symbol()
    }

    fn symbol_rate(&self) -> u32 {
        self.config.baud_rate
    }

    fn reset(&mut self) {
        self.oscillator.reset();
        self.keyer.reset();
    }
}

/// Encode `message` as FSK9600
pub fn encode_fsk9600(message: &[u8], sample_rate: u32) -> Result<PcmBuffer> {
    FskModulator::new(FskConfig::fsk9600(), sample_rate)?.encode(message)
}

/// Encode `message` as UFSK1200
pub fn encode_ufsk1200(message: &[u8], sample_rate: u32) -> Result<PcmBuffer> {
    FskModulator::new(FskConfig::ufsk1200(), sample_rate)?.encode(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawsignal_core::fft::SpectrumAnalyzer;
    use rawsignal_core::DEFAULT_SAMPLE_RATE;

    fn dominant(samples: &[i16]) -> f64 {
        SpectrumAnalyzer::new(samples.len(), DEFAULT_SAMPLE_RATE)
            .unwrap()
            .analyze(samples)
            .unwrap()
            .peak_frequency()
    }

    #[test]
    fn test_presets() {
        let fsk = FskConfig::fsk9600();
        assert_eq!((fsk.mark_frequency, fsk.space_frequency), (4800.0, 8400.0));
        assert_eq!(fsk.preamble_bits, 0);
        let ufsk = FskConfig::ufsk1200();
        assert_eq!(ufsk.baud_rate, 1200);
        assert_eq!(ufsk.preamble_bits, 20);
    }

    #[test]
    fn test_empty_message_rejected() {
        assert!(encode_fsk9600(b"", DEFAULT_SAMPLE_RATE).is_err());
        assert!(encode_ufsk1200(b"", DEFAULT_SAMPLE_RATE).is_err());
    }

    #[test]
    fn test_fsk9600_length() {
        // 22050 / 9600 truncates to 2 samples per bit
        let pcm = encode_fsk9600(b"AB", DEFAULT_SAMPLE_RATE).unwrap();
        assert_eq!(pcm.len(), 16 * 2);
    }

    #[test]
    fn test_ufsk1200_length() {
        let modulator = FskModulator::new(FskConfig::ufsk1200(), DEFAULT_SAMPLE_RATE).unwrap();
        assert_eq!(modulator.message_bit_count(3), 44);
        let pcm = encode_ufsk1200(b"abc", DEFAULT_SAMPLE_RATE).unwrap();
        assert_eq!(pcm.len(), 44 * 18);
        assert_eq!(pcm.len(), modulator.message_pcm_length(3));
    }

    #[test]
    fn test_all_ones_is_mark_tone() {
        // 0xFF repeated: every bit keys the 1200 Hz mark tone
        let message = vec![0xFF; 64];
        let mut modulator = FskModulator::new(
            FskConfig {
                preamble_bits: 0,
                ..FskConfig::ufsk1200()
            },
            DEFAULT_SAMPLE_RATE,
        )
        .unwrap();
        let pcm = modulator.encode(&message).unwrap();
        let peak = dominant(&pcm.samples()[..4096]);
        assert!((peak - 1200.0).abs() < 10.0, "peak at {}", peak);
    }

    #[test]
    fn test_all_zeros_is_space_tone() {
        let pcm = encode_fsk9600(&[0x00; 256], DEFAULT_SAMPLE_RATE).unwrap();
        let peak = dominant(&pcm.samples()[..4096]);
        assert!((peak - 8400.0).abs() < 10.0, "peak at {}", peak);
    }

    #[test]
    fn test_modulate_raw_bits() {
        let mut modulator = FskModulator::new(FskConfig::ufsk1200(), DEFAULT_SAMPLE_RATE).unwrap();
        let pcm = modulator.modulate(&[true, false, true]).unwrap();
        assert_eq!(pcm.len(), modulator.pcm_length(3));
        assert_eq!(modulator.symbol_rate(), 1200);
    }
}
