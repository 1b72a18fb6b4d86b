//! rawsignal Core - PCM primitives shared by all encoders
//!
//! This crate provides the pre-sized PCM sample buffer, the
//! phase-continuous tone oscillator, nearest-neighbour resampling and
//! a spectrum analyzer used to inspect generated tones.

pub mod buffer;
pub mod error;
#[cfg(feature = "spectrum")]
pub mod fft;
pub mod oscillator;
pub mod resample;

pub use error::{CoreError, Result};

/// Sample rate used when the caller does not choose one
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Peak amplitude of generated PCM. Half of i16 full scale to leave headroom.
pub const MAX_PCM_VALUE: i16 = 16383;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        buffer::PcmBuffer,
        error::{CoreError, Result},
        oscillator::{samples_per_bit, PhaseOscillator},
        resample::NearestResampler,
        DEFAULT_SAMPLE_RATE, MAX_PCM_VALUE,
    };

    #[cfg(feature = "spectrum")]
    pub use crate::fft::{Spectrum, SpectrumAnalyzer};
}
