//! Audio Frequency Shift Keying (AFSK) implementation
//!
//! AFSK1200 carries AX.25 packets: HDLC bits are NRZI coded and the line
//! level keys a Bell 202 tone pair on one phase-continuous oscillator.

use crate::common::{key_bits, ModulationConfig, Modulator, NrziKeyer, ToneKeyer, TonePair};
use crate::Result;
use rawsignal_core::buffer::PcmBuffer;
use rawsignal_core::oscillator::PhaseOscillator;
use rawsignal_core::{DEFAULT_SAMPLE_RATE, MAX_PCM_VALUE};
use rawsignal_frame::ax25::{Ax25Frame, Callsign, SsidPolicy};
use rawsignal_frame::hdlc::{HdlcEncoder, DEFAULT_PREAMBLE_FLAGS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// AFSK configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfskConfig {
    /// Tone for the mark line level
    pub mark_frequency: f64,
    /// Tone for the space line level
    pub space_frequency: f64,
    pub baud_rate: u32,
}

impl AfskConfig {
    /// Bell 202, 1200 baud
    pub fn bell_202() -> Self {
        Self {
            mark_frequency: 1200.0,
            space_frequency: 2200.0,
            baud_rate: 1200,
        }
    }

    pub fn tones(&self) -> TonePair {
        TonePair::new(self.mark_frequency, self.space_frequency)
    }
}

impl Default for AfskConfig {
    fn default() -> Self {
        Self::bell_202()
    }
}

/// AFSK modulator.
///
/// Oscillator phase and NRZI line level belong to the modulator and are
/// reset at the start of every [`Modulator::modulate`] call.
pub struct AfskModulator {
    config: ModulationConfig,
    oscillator: PhaseOscillator,
    keyer: NrziKeyer,
}

impl AfskModulator {
    /// Create a new AFSK modulator
    pub fn new(afsk_config: AfskConfig, sample_rate: u32) -> Result<Self> {
        let config = ModulationConfig::new(sample_rate, afsk_config.baud_rate)?;
        let tones = afsk_config.tones();
        tones.validate(sample_rate)?;

        Ok(Self {
            config,
            oscillator: PhaseOscillator::new(sample_rate, MAX_PCM_VALUE)?,
            keyer: NrziKeyer::new(tones),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

impl Modulator for AfskModulator {
    fn pcm_length(&self, bit_count: usize) -> usize {
        bit_count * self.samples_per_symbol()
    }

    fn modulate(&mut self, bits: &[bool]) -> Result<PcmBuffer> {
        self.reset();

        let len = self.pcm_length(bits.len());
        let mut out = PcmBuffer::with_exact_capacity(len, self.config.sample_rate)?;
        let samples_per_bit = self.samples_per_symbol();
        key_bits(
            &mut self.oscillator,
            &mut self.keyer,
            bits.iter().copied(),
            samples_per_bit,
            &mut out,
        )?;

        debug!(bits = bits.len(), samples = len, "AFSK modulated");
        Ok(out.finish()?)
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

/// Options for a complete AX.25 transmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ax25Options {
    pub sample_rate: u32,
    pub preamble_flags: usize,
    pub ssid_policy: SsidPolicy,
    pub afsk: AfskConfig,
}

impl Default for Ax25Options {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            preamble_flags: DEFAULT_PREAMBLE_FLAGS,
            ssid_policy: SsidPolicy::default(),
            afsk: AfskConfig::bell_202(),
        }
    }
}

/// Build a UI frame from `source` to `dest` and render it as AFSK1200.
///
/// Callsigns are `CALL` or `CALL-SSID`. The frame is fully assembled and
/// the output buffer allocated before any sample is produced.
pub fn encode_ax25(
    source: &str,
    dest: &str,
    info: &[u8],
    options: &Ax25Options,
) -> Result<PcmBuffer> {
    let source = Callsign::parse(source, options.ssid_policy)?;
    let dest = Callsign::parse(dest, options.ssid_policy)?;
    let frame = Ax25Frame::ui(dest, source, info);
    let bytes = frame.to_bytes()?;

    let mut hdlc = HdlcEncoder::with_preamble(options.preamble_flags);
    let bits = hdlc.encode(&bytes)?;

    let mut modulator = AfskModulator::new(options.afsk.clone(), options.sample_rate)?;
    let pcm = modulator.modulate(&bits)?;

    info!(
        source = %frame.source,
        dest = %frame.dest,
        info_bytes = info.len(),
        bits = bits.len(),
        samples = pcm.len(),
        "AX.25 frame encoded"
    );
    Ok(pcm)
}
