//! Pre-sized PCM sample buffers

use crate::{CoreError, Result};
use std::ops::Index;

/// Allocate an empty vector able to hold exactly `len` elements.
///
/// Allocation failure is reported as [`CoreError::AllocationFailed`]
/// instead of aborting the process.
pub fn try_with_capacity<T>(len: usize, what: &'static str) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| CoreError::AllocationFailed { what, len })?;
    Ok(data)
}

/// Signed 16-bit PCM buffer with a fixed expected length.
///
/// The length is computed by the caller before synthesis starts; writers
/// may fill up to that length and never past it.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
    expected_len: usize,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Create an empty buffer with room for exactly `len` samples
    pub fn with_exact_capacity(len: usize, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }

        Ok(Self {
            samples: try_with_capacity(len, "PCM buffer")?,
            expected_len: len,
            sample_rate,
        })
    }

    /// Wrap already generated samples
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }

        Ok(Self {
            expected_len: samples.len(),
            samples,
            sample_rate,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples written so far
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length the buffer was sized for
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Samples that may still be written
    pub fn remaining(&self) -> usize {
        self.expected_len - self.samples.len()
    }

    pub fn is_complete(&self) -> bool {
        self.samples.len() == self.expected_len
    }

    /// Get a reference to the underlying samples
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    /// Duration of the written samples in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Append a single sample
    pub fn push(&mut self, sample: i16) -> Result<()> {
        self.ensure_room(1)?;
        self.samples.push(sample);
        Ok(())
    }

    /// Append `count` samples produced by `next`
    pub fn extend_with(&mut self, count: usize, mut next: impl FnMut() -> i16) -> Result<()> {
        self.ensure_room(count)?;
        self.samples.extend((0..count).map(|_| next()));
        Ok(())
    }

    /// Append already generated samples
    pub fn extend_from_slice(&mut self, samples: &[i16]) -> Result<()> {
        self.ensure_room(samples.len())?;
        self.samples.extend_from_slice(samples);
        Ok(())
    }

    /// Append `count` zero samples
    pub fn extend_silence(&mut self, count: usize) -> Result<()> {
        self.extend_with(count, || 0)
    }

    /// Check that synthesis filled the buffer exactly
    pub fn finish(self) -> Result<Self> {
        if !self.is_complete() {
            return Err(CoreError::BufferSizeMismatch {
                expected: self.expected_len,
                actual: self.samples.len(),
            });
        }
        Ok(self)
    }

    /// Serialize as signed 16-bit little-endian bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn ensure_room(&self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(CoreError::BufferSizeMismatch {
                expected: self.expected_len,
                actual: self.samples.len() + count,
            });
        }
        Ok(())
    }
}

impl Index<usize> for PcmBuffer {
    type Output = i16;

    fn index(&self, index: usize) -> &Self::Output {
        &self.samples[index]
    }
}

impl AsRef<[i16]> for PcmBuffer {
    fn as_ref(&self) -> &[i16] {
        &self.samples
    }
}
