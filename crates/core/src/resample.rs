//! Sample rate conversion

use crate::buffer::PcmBuffer;
use crate::{CoreError, Result};

/// Nearest-neighbour resampler for two-level symbol streams.
///
/// Rectangular symbols have no in-between values worth interpolating, so
/// each output sample simply copies the closest input sample.
#[derive(Debug, Clone, Copy)]
pub struct NearestResampler {
    input_rate: u32,
    output_rate: u32,
    ratio: f64,
}

impl NearestResampler {
    /// Create a new resampler
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: input_rate });
        }
        if output_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: output_rate });
        }

        Ok(Self {
            input_rate,
            output_rate,
            ratio: input_rate as f64 / output_rate as f64,
        })
    }

    /// Get the input sample rate
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Get the output sample rate
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Input samples per output sample
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Input index that feeds output sample `output_index`
    pub fn source_index(&self, output_index: usize) -> usize {
        (output_index as f64 * self.ratio).round() as usize
    }

    /// Fill the rest of `output` from `input`.
    ///
    /// Output positions that map past the end of `input` become silence.
    pub fn process(&self, input: &[i16], output: &mut PcmBuffer) -> Result<()> {
        if output.sample_rate() != self.output_rate {
            return Err(CoreError::ResampleError {
                msg: format!(
                    "output buffer is at {} Hz, resampler produces {} Hz",
                    output.sample_rate(),
                    self.output_rate
                ),
            });
        }

        let mut index = output.len();
        let remaining = output.remaining();
        output.extend_with(remaining, || {
            let sample = input.get(self.source_index(index)).copied().unwrap_or(0);
            index += 1;
            sample
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resampler_creation() {
        let resampler = NearestResampler::new(38400, 22050).unwrap();
        assert_eq!(resampler.input_rate(), 38400);
        assert_eq!(resampler.output_rate(), 22050);
        assert!((resampler.ratio() - 38400.0 / 22050.0).abs() < 1e-12);
        assert!(NearestResampler::new(0, 22050).is_err());
    }

    #[test]
    fn test_source_index_rounds() {
        let resampler = NearestResampler::new(3, 2).unwrap();
        let indices: Vec<usize> = (0..5).map(|i| resampler.source_index(i)).collect();
        assert_eq!(indices, vec![0, 2, 3, 5, 6]);
    }

    #[test]
    fn test_downsample_by_two() {
        let resampler = NearestResampler::new(2000, 1000).unwrap();
        let input = [1, 2, 3, 4, 5, 6];
        let mut output = PcmBuffer::with_exact_capacity(3, 1000).unwrap();
        resampler.process(&input, &mut output).unwrap();
        assert_eq!(output.samples(), &[1, 3, 5]);
    }

    #[test]
    fn test_past_end_is_silence() {
        let resampler = NearestResampler::new(1000, 1000).unwrap();
        let mut output = PcmBuffer::with_exact_capacity(5, 1000).unwrap();
        resampler.process(&[9, 9, 9], &mut output).unwrap();
        assert_eq!(output.samples(), &[9, 9, 9, 0, 0]);
    }

    #[test]
    fn test_rate_mismatch() {
        let resampler = NearestResampler::new(38400, 22050).unwrap();
        let mut output = PcmBuffer::with_exact_capacity(4, 48000).unwrap();
        assert!(resampler.process(&[1, 2], &mut output).is_err());
    }
}
