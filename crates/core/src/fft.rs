//! Spectral view of generated PCM
//!
//! Used to check which tones a rendered signal actually carries.

use crate::{CoreError, Result};
use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Hann-windowed forward FFT over blocks of `size` samples
pub struct SpectrumAnalyzer {
    sample_rate: u32,
    window: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: u32) -> Result<Self> {
        if size < 2 || !size.is_power_of_two() {
            return Err(CoreError::FftError {
                msg: format!("analysis block must be a power of 2 of at least 2, got {}", size),
            });
        }
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }

        let span = (size - 1) as f64;
        let window = (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / span).cos()))
            .collect();
        let fft = FftPlanner::new().plan_fft_forward(size);

        Ok(Self {
            sample_rate,
            window,
            fft,
        })
    }

    pub fn size(&self) -> usize {
        self.window.len()
    }

    /// Hz covered by one bin
    pub fn bin_width(&self) -> f64 {
        self.sample_rate as f64 / self.size() as f64
    }

    /// Power spectrum of the first [`SpectrumAnalyzer::size`] samples
    pub fn analyze(&self, pcm: &[i16]) -> Result<Spectrum> {
        let size = self.size();
        if pcm.len() < size {
            return Err(CoreError::BufferSizeMismatch {
                expected: size,
                actual: pcm.len(),
            });
        }

        let mut buffer: Vec<Complex64> = pcm[..size]
            .iter()
            .zip(&self.window)
            .map(|(&s, w)| Complex64::new(s as f64 * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        Ok(Spectrum {
            power: buffer[..=size / 2].iter().map(|c| c.norm_sqr()).collect(),
            bin_width: self.bin_width(),
        })
    }
}

/// Power per bin from DC up to Nyquist
#[derive(Debug, Clone)]
pub struct Spectrum {
    power: Vec<f64>,
    bin_width: f64,
}

impl Spectrum {
    pub fn bins(&self) -> &[f64] {
        &self.power
    }

    pub fn bin_of(&self, frequency: f64) -> usize {
        ((frequency / self.bin_width).round() as usize).min(self.power.len() - 1)
    }

    fn peak_bin(&self) -> usize {
        self.power
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(bin, _)| bin)
    }

    /// Frequency of the strongest non-DC bin
    pub fn peak_frequency(&self) -> f64 {
        self.peak_bin() as f64 * self.bin_width
    }

    /// Strongest power within one bin of `frequency`, as a fraction of the
    /// peak. 0 for a silent block.
    pub fn level_at(&self, frequency: f64) -> f64 {
        let peak = self.power[self.peak_bin()];
        if peak <= 0.0 {
            return 0.0;
        }
        let bin = self.bin_of(frequency);
        let lo = bin.saturating_sub(1);
        let hi = (bin + 1).min(self.power.len() - 1);
        self.power[lo..=hi].iter().cloned().fold(0.0, f64::max) / peak
    }
}
